use kube::CustomResourceExt;
use rhmi_config_operator::crd::RHMIConfig;

fn main() -> anyhow::Result<()> {
    // Pipe through `yq -P` for YAML
    let crd = serde_json::to_string_pretty(&RHMIConfig::crd())?;
    println!("{}", crd);
    Ok(())
}
