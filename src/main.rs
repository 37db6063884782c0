use arscan::config::{SimConfig, stabilizer_config_from_env};
use arscan::session::{self, SessionError};
use arscan::sim::SimulatedHost;
use stabilizer::stabilizer::Stabilizer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), SessionError> {
    tracing_subscriber::fmt::init();

    let config = stabilizer_config_from_env();
    let sim = SimConfig::from_env();
    let host = SimulatedHost::new(&sim);
    tracing::info!(
        natural_width = sim.natural_width,
        natural_height = sim.natural_height,
        container = ?sim.container(),
        adversarial = sim.adversarial,
        "simulated scanner mounted"
    );

    let mut handle = session::spawn(Stabilizer::new(host.clone(), config));
    if handle.settled().await.is_none() {
        tracing::warn!("session ended before the first cycle settled");
    }

    // Rotate the device: the container swaps axes and the cycle restarts.
    host.set_container(sim.rotated_container());
    handle.resize()?;
    if handle.settled().await.is_none() {
        tracing::warn!("session ended before the rotated cycle settled");
    }

    let summary = handle.teardown().await?;
    tracing::info!(
        cycles = summary.cycles,
        state = %summary.final_state,
        overlay_revealed = summary.overlay_revealed,
        style_writes = host.apply_count(),
        library_restyles = host.library_restyles(),
        "demo finished"
    );
    Ok(())
}
