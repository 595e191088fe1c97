use notetree_core::transport::{Method, RequestOptions};

use crate::commands::common::{build_client, describe_payload};
use crate::error::CliError;

pub async fn run_fetch(path: &str, base_url: Option<&str>) -> Result<(), CliError> {
    let client = build_client(base_url, "/")?;
    let payload = client
        .transport()
        .request(Method::GET, path, RequestOptions::new())
        .await?;
    println!("{}", describe_payload(&payload)?);
    Ok(())
}
