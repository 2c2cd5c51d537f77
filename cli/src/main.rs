//! Polls a TCS3472 colour sensor attached to a Linux I2C character device
//! and prints one `Int, RGB` line per reading.

use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use linux_embedded_hal::I2cdev;
use tcs3472::Tcs3472;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// I2C character device the sensor is attached to
    #[arg(long, default_value = "/dev/i2c-1")]
    bus: String,

    /// Read continuously, this many milliseconds apart
    #[arg(short, long, value_name = "MS")]
    interval: Option<u64>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
}

fn read(sensor: &mut Tcs3472<I2cdev>, interval: Option<u64>) -> Result<(), String> {
    // The first integration cycle after power-up takes up to 614 ms.
    while !sensor.valid().map_err(|e| format!("{e:?}"))? {
        thread::sleep(Duration::from_millis(10));
    }

    loop {
        let light = sensor.measure().map_err(|e| format!("{e:?}"))?;
        println!(
            "Int: {}, RGB: {:.3}, {:.3}, {:.3}",
            light.intensity, light.red, light.green, light.blue
        );

        match interval {
            Some(ms) => thread::sleep(Duration::from_millis(ms)),
            None => return Ok(()),
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let i2c = I2cdev::new(&args.bus).map_err(|e| format!("opening {}: {e}", args.bus))?;
    let mut sensor = Tcs3472::new(i2c).map_err(|e| format!("{e:?}"))?;
    log::debug!(
        "{sensor} up, max channel count {} at default integration time",
        sensor.max_count()
    );

    let res = read(&mut sensor, args.interval);
    let halt_res = sensor.halt().map_err(|e| format!("{e:?}"));
    res.and(halt_res)
}

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = run(&args) {
        eprintln!("tcs3472: {e}.");
        process::exit(1);
    }
}
