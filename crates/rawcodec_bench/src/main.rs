use rawcodec::ByteOrder;
use rawcodec_bench::{BenchConfig, Channel, run};

fn main() {
    let configs = vec![
        BenchConfig::default(),
        BenchConfig {
            host_order: ByteOrder::Big,
            ..Default::default()
        },
        BenchConfig {
            element_count: 100_000_000,
            channels: vec![Channel::File],
            ..Default::default()
        },
    ];
    run(&configs).unwrap();
}
