use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use p2pwire::{Fields, Message, Network, Value, catalog, fields, message_from_binary};

const MAGIC: [u8; 4] = Network::Mainnet.magic();

fn ping() -> Message {
    catalog::PING
        .message(fields! { "nonce" => [0x42u8; 8] })
        .unwrap()
}

fn address() -> Fields {
    fields! {
        "services" => 1u64,
        "address" => "2001:db8::ff00:42:8329",
        "port" => 8333u16,
    }
}

fn version() -> Message {
    catalog::VERSION
        .message(fields! {
            "version" => 70_015i32,
            "services" => 1u64,
            "timestamp" => 1_700_000_000i64,
            "addr_recv" => address(),
            "addr_from" => address(),
            "nonce" => [0x17u8; 8],
            "user_agent" => "/p2pwire:0.1.0/",
            "start_height" => 800_000i32,
        })
        .unwrap()
}

fn tx(inputs: usize) -> Message {
    let tx_in = (0..inputs)
        .map(|i| {
            Value::Struct(fields! {
                "previous_output" => fields! { "hash" => [i as u8; 32], "index" => i as u32 },
                "signature_script" => vec![0x30u8; 107],
                "sequence" => u32::MAX,
            })
        })
        .collect::<Vec<_>>();

    catalog::TX
        .message(fields! {
            "version" => 2u32,
            "tx_in" => tx_in,
            "tx_out" => vec![Value::Struct(fields! {
                "value" => 100_000i64,
                "pk_script" => vec![0x00u8; 22],
            })],
            "lock_time" => 0u32,
        })
        .unwrap()
}

fn cases() -> [(&'static str, Message); 4] {
    [
        ("ping", ping()),
        ("version", version()),
        ("tx_1_input", tx(1)),
        ("tx_64_inputs", tx(64)),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for (name, message) in cases() {
        let len = message.encode(&MAGIC).unwrap().len();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("encode_{name}"), |b| {
            b.iter(|| {
                black_box(message.encode(&MAGIC).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for (name, message) in cases() {
        let encoded = bytes::Bytes::from(message.encode(&MAGIC).unwrap());
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_function(format!("decode_{name}"), |b| {
            b.iter(|| {
                black_box(message_from_binary(encoded.clone()).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let values = tx(64).into_values();
    group.bench_function("validate_tx_64_inputs", |b| {
        b.iter(|| {
            black_box(catalog::TX.message(values.clone()).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_validate);
criterion_main!(benches);
