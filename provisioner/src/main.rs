use clap::Parser;

mod args;
mod libs;

use libs::Provisioner;

/// The Azure ML compute provisioner
#[tokio::main]
async fn main() {
    // get command line args
    let args = args::Args::parse();
    // setup our tracer
    azureml::utils::trace::setup("AzureMlProvisioner", args.log_level);
    // setup provisioner
    let mut provisioner = Provisioner::new(&args)
        .await
        .expect("Provisioner failed to initialize");
    // get or create our compute cluster
    provisioner.get_or_create().await.expect("Provisioner crashed");
}
