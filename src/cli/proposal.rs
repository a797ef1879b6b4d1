use super::config::NodeopsConfig;
use nodeops::proposal::ProposalReport;
use nodeops::rpc::{fetch_current_epoch, fetch_proposal, NodeQuery, RpcClient};

/// Fetch a proposal and the current epoch, and render them.
pub async fn render<Q: NodeQuery + ?Sized>(
    node: &Q,
    proposal_id: u64,
    hrp: &str,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let epoch = fetch_current_epoch(node).await?;
    let record = fetch_proposal(node, proposal_id).await?;
    let report = ProposalReport::new(&record, epoch, hrp)?;

    if json {
        Ok(report.to_json()?)
    } else {
        Ok(report.to_text())
    }
}

/// Decode and display a governance proposal
pub async fn execute(
    config: &NodeopsConfig,
    proposal_id: u64,
    rpc_url: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = rpc_url.unwrap_or_else(|| config.rpc.url.clone());
    tracing::info!(url = %url, proposal_id, "querying proposal");

    let client = RpcClient::new(url, config.rpc.timeout())?;
    let output = render(&client, proposal_id, &config.address.hrp, json).await?;
    println!("{}", output);
    Ok(())
}
