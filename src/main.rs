use azure_rg_inventory::output::{inventory_json, inventory_table};
use azure_rg_inventory::{get_resource_group_details, OutputFormat, Settings};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        eprintln!("Error initializing log4rs: {e}");
    }
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let settings = Settings::from_env()?;
    let inventory = get_resource_group_details(&settings).await?;

    match settings.output {
        OutputFormat::Json => println!("{}", inventory_json(&inventory)?),
        OutputFormat::Table => println!("{}", inventory_table(&inventory)),
    }

    Ok(())
}
