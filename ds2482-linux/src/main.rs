use std::time::{Duration, Instant};

use clap::Parser;
use ds2482::Monotonic;

/// Poll DS18B20 sensors behind a DS2482-800 bridge and log their temperatures
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// Number of channels with a sensor attached, counting up from channel 0
    #[arg(short, long, default_value_t = 1)]
    channels: u8,
}

/// Millisecond clock over [`Instant`].
struct WallClock(Instant);

impl Monotonic for WallClock {
    fn now_ms(&mut self) -> u32 {
        self.0.elapsed().as_millis() as u32
    }
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Open the I2C bus
    let i2c = linux_embedded_hal::I2cdev::new(&args.path).expect("Failed to open I2C device");
    let delay = linux_embedded_hal::Delay;
    // Create the bridge driver and bring the device up
    let mut bridge = ds2482::Ds2482::new(i2c, delay, WallClock(Instant::now()));
    bridge.begin().expect("Failed to initialize DS2482-800");
    loop {
        for channel in 0..args.channels.min(8) {
            // Kick off a conversion, then poll instead of sleeping it out
            if let Err(err) = bridge.start_temperature_conversion(channel) {
                log::warn!("channel {}: conversion not started: {:?}", channel, err);
                bridge.clear_state();
                continue;
            }
            while !bridge.check_conversion_status() {
                std::thread::sleep(Duration::from_millis(10));
            }
            match bridge.read_temperature(channel) {
                Ok(celsius) => log::info!("channel {}: {:.4} C", channel, celsius),
                Err(err) => {
                    log::warn!("channel {}: read failed: {:?}", channel, err);
                    bridge.clear_state();
                }
            }
        }
    }
}
