//! Polling authentication example
//!
//! Opens a session against the loopback driver, polls until the link
//! authenticates, then closes. Set RUST_LOG=debug to watch the state
//! machine.

use std::time::Duration;

use hdcpup::{AuthSession, CheckOutcome, NonceSource};
use hdcpup_core::facsimile;
use hdcpup_link::LoopbackLink;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // A real deployment gets the glob from the vendor provisioning
    // mechanism and the driver from the OS; the facsimile set drives the
    // same code paths end to end.
    let driver = LoopbackLink::new(
        facsimile::FACSIMILE_KEYS,
        facsimile::FACSIMILE_C,
        facsimile::FACSIMILE_D,
        facsimile::FACSIMILE_DKSV,
        facsimile::FACSIMILE_BKSV,
    )
    .with_pending_polls(2);

    let nonces = NonceSource::new(StdRng::from_os_rng());
    let mut session = AuthSession::open(driver, &facsimile::facsimile_glob(), nonces)?;

    println!("Session open, polling...");
    loop {
        match session.check_status()? {
            CheckOutcome::Pending => {
                println!("  link pending, retrying...");
                std::thread::sleep(Duration::from_millis(200));
            }
            CheckOutcome::Authenticated => {
                println!("  link authenticated!");
                break;
            }
            CheckOutcome::Failed(reason) => {
                println!("  link denied: {reason}");
                break;
            }
        }
    }

    session.close();
    println!("Done!");
    Ok(())
}
