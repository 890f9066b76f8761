use criterion::{black_box, criterion_group, criterion_main, Criterion};
use iec61850_rs::apci::{codec, ApduAssembler, SeqNr};
use iec61850_rs::datalink::{pack, EtherHeader, EtherType};

fn encode_benchmark(c: &mut Criterion) {
    let asdu = vec![0x64; 200];

    c.bench_function("encode_information", |b| {
        b.iter(|| codec::encode_information(black_box(SeqNr::new(42)), SeqNr::new(7), &asdu))
    });

    c.bench_function("encode_supervisory", |b| {
        b.iter(|| codec::encode_supervisory(black_box(SeqNr::new(42))))
    });

    let header = EtherHeader::new([0x01, 0x0C, 0xCD, 0x01, 0x00, 0x01], [0; 6], EtherType::Goose, 1);
    c.bench_function("pack_goose", |b| b.iter(|| pack(black_box(&header), &asdu)));
}

fn decode_benchmark(c: &mut Criterion) {
    let apdu = codec::encode_information(SeqNr::new(42), SeqNr::new(7), &[0x64; 200]).unwrap();

    c.bench_function("decode_information", |b| {
        b.iter(|| codec::decode(black_box(&apdu)))
    });

    let stream: Vec<u8> = (0..32)
        .flat_map(|n| codec::encode_supervisory(SeqNr::new(n)).to_vec())
        .collect();
    c.bench_function("assemble_stream", |b| {
        b.iter(|| {
            let mut assembler = ApduAssembler::new();
            assembler.extend(black_box(&stream));
            let mut count = 0;
            while let Ok(Some(_)) = assembler.next_apdu() {
                count += 1;
            }
            count
        })
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);
