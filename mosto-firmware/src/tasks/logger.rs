//! Persistent brewing log task
//!
//! Appends header lines and telemetry rows to the flash log queue and dumps
//! the stored lines to the defmt stream on request.

use core::str;

use defmt::*;

use mosto_core::telemetry::LogRequest;
use mosto_hal_rp2040::flash::Rp2040FlashStorage;
use mosto_hal_rp2040::LogStorage;

use crate::channels::FwChannels;

#[embassy_executor::task]
pub async fn logger_task(mut storage: Rp2040FlashStorage<'static>, channels: &'static FwChannels) {
    info!("Logger task started");

    loop {
        let req = channels.log.receive().await;

        if req == LogRequest::Dump {
            dump(&mut storage).await;
            continue;
        }

        if let Some(line) = req.line() {
            if let Err(e) = storage.append(line.as_bytes()).await {
                warn!("Log write failed: {:?}", e);
            }
        }
    }
}

async fn dump(storage: &mut Rp2040FlashStorage<'static>) {
    info!("--- brewing log ---");

    let result = storage
        .for_each(|record| match str::from_utf8(record) {
            Ok(line) => info!("{}", line),
            Err(_) => warn!("Skipping {} byte record with bad UTF-8", record.len()),
        })
        .await;

    match result {
        Ok(count) => info!("--- {} lines ---", count),
        Err(e) => warn!("Log read failed: {:?}", e),
    }
}
