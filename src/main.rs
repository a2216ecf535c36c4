use clap::Parser;
use lora_router::utils::error::ErrorSeverity;
use lora_router::utils::{logger, validation::Validate};
use lora_router::{build_http_router, CliArgs, HttpTransport, InferenceResult, SupportRouter};
use tokio::io::{AsyncBufReadExt, BufReader};

const SAMPLE_QUERIES: [&str; 6] = [
    "Hola, mi producto no está funcionando correctamente",
    "Necesito información sobre mi última factura",
    "Bonjour, je ne peux pas accéder à mon compte",
    "Quelles sont les caractéristiques du produit?",
    "Привет, мой продукт сломался",
    "Сколько стоит подписка?",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config = match args.router_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置（日誌設定本身也在其中，因此先於初始化日誌）
    if let Err(e) = config.validate() {
        eprintln!("❌ Configuration validation failed: {}", e);
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(exit_code(e.severity()));
    }

    // 初始化日誌
    logger::init_cli_logger(args.verbose, &config.logging())?;
    tracing::info!("🚀 Starting lora-router");

    let router = match build_http_router(&config) {
        Ok(router) => router,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    };
    tracing::info!("✅ Routing to {}", config.endpoint.url);

    let mut failures = 0usize;

    if args.samples {
        for query in SAMPLE_QUERIES {
            failures += run_query(&router, query, &args).await;
        }
    } else if let Some(query) = args.query_text() {
        failures += run_query(&router, &query, &args).await;
    } else {
        // 互動模式：每行一個查詢
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            failures += run_query(&router, query, &args).await;
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_query(router: &SupportRouter<HttpTransport>, query: &str, args: &CliArgs) -> usize {
    if args.dry_run {
        let (classification, request) = router.prepare(query);
        println!(
            "🔍 {} → language: {}, domain: {}",
            query, classification.language, classification.domain
        );
        return match request {
            Ok(request) => {
                match serde_json::to_string_pretty(&request) {
                    Ok(payload) => println!("{}", payload),
                    Err(e) => eprintln!("❌ Could not render payload: {}", e),
                }
                0
            }
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                1
            }
        };
    }

    let result = router.process(query).await;
    print_result(&result, args.json);
    usize::from(!result.is_success())
}

fn print_result(result: &InferenceResult, as_json: bool) {
    if as_json {
        match serde_json::to_string(result) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("❌ Could not render result: {}", e),
        }
        return;
    }

    match result {
        InferenceResult::Success {
            language,
            domain,
            adapter_name,
            response,
            ..
        } => {
            println!("✅ [{} / {} via {}]", language, domain, adapter_name);
            println!("{}", response);
        }
        InferenceResult::Error {
            language,
            domain,
            error_message,
            ..
        } => {
            eprintln!("❌ [{} / {}] {}", language, domain, error_message);
        }
    }
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
