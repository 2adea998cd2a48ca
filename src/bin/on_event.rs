use dynamo_table_manager::client::build_client;
use dynamo_table_manager::config::Settings;
use dynamo_table_manager::lifecycle::{LifecycleController, LifecycleEvent, OnEventResponse};
use dynamo_table_manager::logging;
use dynamo_table_manager::table_operations::DynamoTableProvisioner;
use lambda_runtime::{service_fn, Error, LambdaEvent};

async fn handle_request(
    controller: &LifecycleController<DynamoTableProvisioner>,
    event: LambdaEvent<LifecycleEvent>,
) -> Result<OnEventResponse, Error> {
    controller.on_event(&event.payload).await.map_err(|error| {
        tracing::error!(request_id = %event.context.request_id, error = %error, "onEvent failed");
        Error::from(error)
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let settings = Settings::from_env()?;
    let provisioner = DynamoTableProvisioner::new(build_client(&settings.client).await);
    let controller = LifecycleController::new(provisioner, settings.waits);
    let controller = &controller;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(controller, event).await
    }))
    .await
}
