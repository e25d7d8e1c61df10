use clip_viewer::{flow, viewer, ViewerConfig};

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::from_env();
    flow::run(vec![viewer::flow::constructor(config)])
}
