use clap::Parser;
use telnyx::TelnyxProvider;
use tfplug::ServeConfig;

const PROVIDER_ADDRESS: &str = "registry.terraform.io/telnyx/telnyx";

#[derive(Parser)]
#[command(name = "terraform-provider-telnyx", version, about = "Terraform provider for Telnyx")]
struct Args {
    /// Run standalone and print TF_REATTACH_PROVIDERS for a debugger session
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    telnyx::logging::init();

    let config = ServeConfig::new(PROVIDER_ADDRESS).with_debug(args.debug);
    tfplug::serve(TelnyxProvider::new(), config).await?;

    Ok(())
}
