#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use lora_router::utils::logger;
#[cfg(feature = "lambda")]
use lora_router::{build_http_router, HttpTransport, InferenceResult, LambdaConfig, SupportRouter};
#[cfg(feature = "lambda")]
use serde::Deserialize;
#[cfg(feature = "lambda")]
use std::sync::Arc;

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub query: String,
}

#[cfg(feature = "lambda")]
async fn function_handler(
    router: Arc<SupportRouter<HttpTransport>>,
    event: LambdaEvent<Request>,
) -> Result<InferenceResult, Error> {
    tracing::info!("Handling support query in Lambda");

    // 路由器不會回傳錯誤，失敗也以 status = error 回覆
    Ok(router.process(&event.payload.query).await)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?.into_router_config()?;
    let router = Arc::new(build_http_router(&config)?);
    tracing::info!("Lambda router ready for {}", config.endpoint.url);

    run(service_fn(move |event| {
        let router = Arc::clone(&router);
        async move { function_handler(router, event).await }
    }))
    .await
}
