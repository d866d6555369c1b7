//! Query button task
//!
//! Pressing the button (active low) asks the radar task to re-read the
//! device info.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use crate::channels::QUERY_REQUEST;

/// Debounce time in milliseconds
const DEBOUNCE_MS: u64 = 50;

#[embassy_executor::task]
pub async fn query_button_task(mut button: Input<'static>) {
    info!("Query button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(DEBOUNCE_MS).await;

        if button.is_low() {
            debug!("Query button pressed");
            QUERY_REQUEST.signal(());
            button.wait_for_high().await;
        }
    }
}
