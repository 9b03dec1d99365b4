use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Write},
    time::{Duration, Instant},
};

use anyhow::{Result, ensure};
use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use rawcodec::{ByteOrder, Codec, Element};
use tempfile::TempDir;

/// Where serialized bytes go during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Memory,
    File,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub element_count: usize,
    pub host_order: ByteOrder,
    pub channels: Vec<Channel>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            element_count: 10_000_000,
            host_order: ByteOrder::NATIVE,
            channels: vec![Channel::Memory, Channel::File],
        }
    }
}

#[derive(Debug)]
struct Measurement {
    bytes: u64,
    write: Duration,
    read: Duration,
}

impl Measurement {
    fn throughput(bytes: u64, elapsed: Duration) -> f64 {
        bytes as f64 / (1024.0 * 1024.0) / elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

pub fn run(configs: &[BenchConfig]) -> Result<()> {
    for config in configs {
        println!(
            "\n=== {} elements, host order {:?} ===",
            config.element_count, config.host_order
        );
        println!(
            "{:<8} {:<8} {:>12} {:>14} {:>14}",
            "type", "channel", "bytes", "write MiB/s", "read MiB/s"
        );
        for &channel in &config.channels {
            bench_type::<u8>("u8", config, channel)?;
            bench_type::<u16>("u16", config, channel)?;
            bench_type::<f32>("f32", config, channel)?;
            bench_type::<f64>("f64", config, channel)?;
        }
    }
    Ok(())
}

fn bench_type<T>(name: &str, config: &BenchConfig, channel: Channel) -> Result<()>
where
    T: Element + PartialEq,
    StandardUniform: Distribution<T>,
{
    let mut rng = rand::rng();
    let values: Vec<T> = (0..config.element_count).map(|_| rng.random()).collect();
    let codec = Codec::new().with_host_order(config.host_order);

    let measurement = match channel {
        Channel::Memory => bench_memory(codec, &values)?,
        Channel::File => bench_file(codec, &values)?,
    };

    println!(
        "{:<8} {:<8} {:>12} {:>14.1} {:>14.1}",
        name,
        format!("{channel:?}"),
        measurement.bytes,
        Measurement::throughput(measurement.bytes, measurement.write),
        Measurement::throughput(measurement.bytes, measurement.read),
    );
    Ok(())
}

fn bench_memory<T: Element + PartialEq>(codec: Codec, values: &[T]) -> Result<Measurement> {
    let capacity = Codec::serialized_len(values.len(), T::WIDTH.bytes())?;
    let mut stream = Vec::with_capacity(capacity as usize);

    let i = Instant::now();
    let bytes = codec.serialize(values, &mut stream)?;
    let write = i.elapsed();

    let i = Instant::now();
    let restored: Vec<T> = codec.deserialize(&mut Cursor::new(&stream), None)?;
    let read = i.elapsed();

    ensure!(restored.as_slice() == values, "memory round trip mismatch");
    Ok(Measurement { bytes, write, read })
}

fn bench_file<T: Element + PartialEq>(codec: Codec, values: &[T]) -> Result<Measurement> {
    let temp = TempDir::new()?;
    let path = temp.path().join("storage.bin");

    let i = Instant::now();
    let mut writer = BufWriter::new(File::create(&path)?);
    let bytes = codec.serialize(values, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    let write = i.elapsed();

    let i = Instant::now();
    let mut reader = BufReader::new(File::open(&path)?);
    let restored: Vec<T> = codec.deserialize(&mut reader, None)?;
    let read = i.elapsed();

    ensure!(restored.as_slice() == values, "file round trip mismatch");
    Ok(Measurement { bytes, write, read })
}
