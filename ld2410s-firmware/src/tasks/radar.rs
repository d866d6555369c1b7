//! Radar task
//!
//! Owns the driver and polls it on a fixed ticker. A query request from
//! the button task queues a fresh device info read.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use ld2410s_driver::{Ld2410s, SequenceStatus};

use crate::channels::QUERY_REQUEST;
use crate::config::{POLL_INTERVAL_MS, QUERY_ON_BOOT};
use crate::transport::{ChannelSink, EmbassyClock, RadarUart};

/// Driver as wired on this board
pub type Radar = Ld2410s<RadarUart, EmbassyClock, ChannelSink>;

#[embassy_executor::task]
pub async fn radar_task(mut radar: Radar) {
    info!("Radar task started");

    let setup = if QUERY_ON_BOOT {
        radar.start()
    } else {
        radar.log_config();
        Ok(())
    };
    if let Err(e) = setup {
        warn!("Radar setup failed: {:?}", e);
    }

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS as u64));
    let mut last_status = radar.status();

    loop {
        match select(ticker.next(), QUERY_REQUEST.wait()).await {
            Either::First(()) => {
                if let Err(e) = radar.poll() {
                    warn!("Radar poll failed: {:?}", e);
                }
            }
            Either::Second(()) => {
                info!("Device info query requested");
                if let Err(e) = radar.read_all_info() {
                    warn!("Device info query not queued: {:?}", e);
                }
            }
        }

        let status = radar.status();
        if status != last_status {
            match status {
                SequenceStatus::Completed => {
                    info!("Command sequence complete");
                    radar.log_config();
                }
                SequenceStatus::Failed { opcode, reason } => {
                    warn!("Command sequence aborted at {:?}: {:?}", opcode, reason)
                }
                SequenceStatus::Idle | SequenceStatus::Running => {}
            }
            last_status = status;
        }
    }
}
