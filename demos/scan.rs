//! Scans every supported breakout on a Linux I²C adapter.
//!
//! ```text
//! cargo run --example scan --features linux -- [bus]
//! ```
//!
//! Devices that do not answer at their default address are reported and
//! skipped.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use embedded_hal::delay::DelayNs;
use piicodev_drivers::linux::LinuxI2c;
use piicodev_drivers::*;

struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }
}

type Scan = fn(&mut LinuxI2c, &mut StdDelay) -> Result<()>;

fn main() -> Result<()> {
    let bus: u8 = match std::env::args().nth(1) {
        Some(arg) => arg.parse().context("bus number must be an integer")?,
        None => 1,
    };
    let mut i2c = LinuxI2c::open(bus).with_context(|| format!("opening /dev/i2c-{}", bus))?;
    let mut delay = StdDelay;

    let scans: [(&str, Scan); 15] = [
        ("TMP117", scan_tmp117),
        ("LM75A", scan_lm75a),
        ("AHT10", scan_aht10),
        ("MS5637", scan_ms5637),
        ("MPU6050", scan_mpu6050),
        ("VEML6030", scan_veml6030),
        ("VEML6040", scan_veml6040),
        ("VL53L1X", scan_vl53l1x),
        ("CAP1203", scan_cap1203),
        ("ENS160", scan_ens160),
        ("Buzzer", scan_buzzer),
        ("RGB LED", scan_rgbled),
        ("Qwiic PIR", scan_qwiic_pir),
        ("Potentiometer", scan_potentiometer),
        ("Switch", scan_switch),
    ];

    for (name, scan) in scans {
        match scan(&mut i2c, &mut delay) {
            Ok(()) => {}
            Err(err) => println!("{:<14} not available: {:#}", name, err),
        }
    }
    Ok(())
}

fn scan_tmp117(i2c: &mut LinuxI2c, _: &mut StdDelay) -> Result<()> {
    let mut sensor = tmp117::TMP117::new(i2c, tmp117::DEFAULT_ADDRESS);
    println!("{:<14} {:.2} °C", "TMP117", sensor.read_celsius()?);
    Ok(())
}

fn scan_lm75a(i2c: &mut LinuxI2c, _: &mut StdDelay) -> Result<()> {
    let mut sensor = lm75a::LM75A::new(i2c, lm75a::DEFAULT_ADDRESS);
    println!("{:<14} {:.1} °C", "LM75A", sensor.read_celsius()?);
    Ok(())
}

fn scan_aht10(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut sensor = aht10::AHT10::new(i2c, aht10::DEFAULT_ADDRESS);
    sensor.init(delay)?;
    let m = sensor.measure(delay)?;
    println!("{:<14} {:.2} °C {:.1} %RH", "AHT10", m.temperature, m.humidity);
    Ok(())
}

fn scan_ms5637(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut sensor = ms5637::MS5637::new(i2c, ms5637::DEFAULT_ADDRESS);
    sensor.init(delay)?;
    let m = sensor.read(delay)?;
    let altitude = sensor.altitude(delay, 1013.25)?;
    println!(
        "{:<14} {:.2} hPa {:.2} °C {:.1} m",
        "MS5637", m.pressure, m.temperature, altitude
    );
    Ok(())
}

fn scan_mpu6050(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut sensor = mpu6050::MPU6050::new(i2c, mpu6050::DEFAULT_ADDRESS);
    sensor.init(delay)?;
    let accel = sensor.read_accel()?;
    let gyro = sensor.read_gyro()?;
    println!(
        "{:<14} accel {:.2} {:.2} {:.2} m/s² gyro {:.1} {:.1} {:.1} °/s {:.1} °C",
        "MPU6050",
        accel.x,
        accel.y,
        accel.z,
        gyro.x,
        gyro.y,
        gyro.z,
        sensor.read_temperature()?
    );
    Ok(())
}

fn scan_veml6030(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut sensor = veml6030::VEML6030::new(i2c, veml6030::DEFAULT_ADDRESS);
    let config = veml6030::Config::default();
    sensor.init(config)?;
    delay.delay_ms(config.integration_time.millis() as u32 + 20);
    println!("{:<14} {:.1} lx", "VEML6030", sensor.read_lux()?);
    Ok(())
}

fn scan_veml6040(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut sensor = veml6040::VEML6040::new(i2c, veml6040::DEFAULT_ADDRESS);
    sensor.init(delay)?;
    let rgbw = sensor.read_rgbw()?;
    let hsv = rgbw.hsv();
    println!(
        "{:<14} rgbw {} {} {} {} cct {:.0} K hue {:.0}",
        "VEML6040",
        rgbw.red,
        rgbw.green,
        rgbw.blue,
        rgbw.white,
        rgbw.cct(),
        hsv.hue
    );
    Ok(())
}

fn scan_vl53l1x(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut sensor = vl53l1x::VL53L1X::new(i2c, vl53l1x::DEFAULT_ADDRESS);
    sensor.init(delay)?;
    let m = sensor.read()?;
    println!("{:<14} {} mm ({:?})", "VL53L1X", m.distance_mm, m.status);
    Ok(())
}

fn scan_cap1203(i2c: &mut LinuxI2c, _: &mut StdDelay) -> Result<()> {
    let mut sensor = cap1203::CAP1203::new(i2c, cap1203::DEFAULT_ADDRESS);
    sensor.init()?;
    let pads = sensor.read()?;
    println!(
        "{:<14} pads {} {} {} deltas {:?}",
        "CAP1203",
        pads.pad1,
        pads.pad2,
        pads.pad3,
        sensor.read_delta_counts()?
    );
    Ok(())
}

fn scan_ens160(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut sensor = ens160::ENS160::new(i2c, ens160::DEFAULT_ADDRESS);
    sensor.init(delay)?;
    let (aqi, rating) = sensor.read_aqi()?;
    let (eco2, eco2_rating) = sensor.read_eco2()?;
    println!(
        "{:<14} {:?} AQI {} ({:?}) TVOC {} ppb eCO2 {} ppm ({:?})",
        "ENS160",
        sensor.operation()?,
        aqi,
        rating,
        sensor.read_tvoc()?,
        eco2,
        eco2_rating
    );
    Ok(())
}

fn scan_buzzer(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut piezo = buzzer::Buzzer::new(i2c, buzzer::DEFAULT_ADDRESS);
    let id = piezo.device_id()?;
    if id != buzzer::DEVICE_ID {
        anyhow::bail!("unexpected device id 0x{:02x}", id);
    }
    let (major, minor) = piezo.firmware_version()?;
    piezo.set_volume(buzzer::Volume::Low)?;
    piezo.tone(880, 200)?;
    delay.delay_ms(250);
    piezo.no_tone()?;
    println!("{:<14} firmware {}.{}", "Buzzer", major, minor);
    Ok(())
}

fn scan_rgbled(i2c: &mut LinuxI2c, delay: &mut StdDelay) -> Result<()> {
    let mut led = rgbled::RgbLed::new(i2c, rgbled::DEFAULT_ADDRESS);
    led.init()?;
    led.set_brightness(32)?;
    for (index, colour) in [[255, 0, 0], [0, 255, 0], [0, 0, 255]].iter().enumerate() {
        led.set_pixel(index, colour[0], colour[1], colour[2])?;
    }
    led.show()?;
    delay.delay_ms(500);
    led.clear()?;
    println!("{:<14} ok", "RGB LED");
    Ok(())
}

fn scan_qwiic_pir(i2c: &mut LinuxI2c, _: &mut StdDelay) -> Result<()> {
    let mut pir = qwiic_pir::QwiicPIR::new(i2c, qwiic_pir::DEFAULT_ADDRESS);
    pir.init()?;
    let events = pir.debounce_events()?;
    println!(
        "{:<14} raw {} detected {} removed {} debounce {} ms",
        "Qwiic PIR",
        pir.raw_reading()?,
        events.detected,
        events.removed,
        pir.debounce_time()?
    );
    Ok(())
}

fn scan_potentiometer(i2c: &mut LinuxI2c, _: &mut StdDelay) -> Result<()> {
    let mut pot = potentiometer::Potentiometer::new(i2c, potentiometer::DEFAULT_ADDRESS);
    let kind = pot.init()?;
    println!("{:<14} {:?} {:.1}", "Potentiometer", kind, pot.read()?);
    Ok(())
}

fn scan_switch(i2c: &mut LinuxI2c, _: &mut StdDelay) -> Result<()> {
    let mut button = switch::Switch::new(i2c, switch::DEFAULT_ADDRESS);
    button.init()?;
    println!(
        "{:<14} pressed {} presses {}",
        "Switch",
        button.is_pressed()?,
        button.press_count()?
    );
    Ok(())
}
