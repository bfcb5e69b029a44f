//! Repeater validation example
//!
//! Authenticates against a loopback sink that reports a three-device
//! downstream topology, then shows a forged downstream list being
//! rejected with a renegotiation request.

use hdcpup::{AuthSession, CheckOutcome, NonceSource};
use hdcpup_core::facsimile;
use hdcpup_link::{LoopbackLink, RepeaterTopology};
use hdcpup_types::{BStatus, Ksv};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn topology() -> RepeaterTopology {
    RepeaterTopology {
        ksv_list: vec![
            Ksv::from_truncated(0x35796a172e),
            Ksv::from_truncated(0x478e71e20f),
            Ksv::from_truncated(0x74e85397a6),
        ],
        bstatus: BStatus::new(0x0103),
    }
}

fn sink() -> LoopbackLink {
    LoopbackLink::new(
        facsimile::FACSIMILE_KEYS,
        facsimile::FACSIMILE_C,
        facsimile::FACSIMILE_D,
        facsimile::FACSIMILE_DKSV,
        facsimile::FACSIMILE_BKSV,
    )
    .with_repeater(topology())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let nonces = NonceSource::new(StdRng::from_os_rng());
    let mut session = AuthSession::open(sink(), &facsimile::facsimile_glob(), nonces)?;
    println!("Checking repeater link...");
    println!("  outcome: {:?}", session.check_status()?);
    session.close();

    // Same topology, but the sink asserts a forged digest.
    let nonces = NonceSource::new(StdRng::from_os_rng());
    let mut session = AuthSession::open(
        sink().with_tampered_digest(),
        &facsimile::facsimile_glob(),
        nonces,
    )?;
    println!("Checking forged downstream list...");
    match session.check_status()? {
        CheckOutcome::Failed(reason) => println!("  denied as expected: {reason}"),
        outcome => println!("  unexpected outcome: {outcome:?}"),
    }
    println!(
        "  renegotiations requested: {}",
        session.driver().renegotiations()
    );
    session.close();

    Ok(())
}
