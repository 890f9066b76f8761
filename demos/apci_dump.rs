//! APCI Frame Dump Demo
//!
//! Decodes APDUs given as hex strings on the command line, or a built-in sample session
//! when no arguments are given, and packs one GOOSE payload for comparison.
//!
//! ```sh
//! RUST_LOG=trace cargo run --example apci_dump --features cli -- 680401000000 68040b000000
//! ```

use iec61850_rs::{
    apci::{codec, ApduAssembler, ControlFunction, SeqNr},
    datalink::{format_mac_address, pack, parse_mac_address, EtherHeader, EtherType},
    util::{format_apdu_structure, hex_dump},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("APCI Frame Dump");
    println!("===============\n");

    let stream = match std::env::args().skip(1).collect::<Vec<_>>() {
        args if args.is_empty() => sample_session()?,
        args => {
            let mut stream = Vec::new();
            for arg in args {
                stream.extend(hex::decode(arg.trim())?);
            }
            stream
        }
    };

    dump_stream(&stream);
    demo_goose_packet()?;
    Ok(())
}

/// A short client/server exchange: STARTDT, one I-frame each way, acknowledgment
fn sample_session() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut stream = Vec::new();
    stream.extend_from_slice(&codec::encode_unnumbered(ControlFunction::StartActive));
    stream.extend_from_slice(&codec::encode_unnumbered(ControlFunction::StartConfirm));
    stream.extend_from_slice(&codec::encode_information(
        SeqNr::ZERO,
        SeqNr::ZERO,
        &[0x64, 0x01, 0x06, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x14],
    )?);
    stream.extend_from_slice(&codec::encode_information(
        SeqNr::ZERO,
        SeqNr::new(1),
        &[0x64, 0x01, 0x07, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x14],
    )?);
    stream.extend_from_slice(&codec::encode_supervisory(SeqNr::new(1)));
    stream.extend_from_slice(&codec::encode_unnumbered(ControlFunction::TestActive));
    Ok(stream)
}

fn dump_stream(stream: &[u8]) {
    println!("Stream ({} bytes):", stream.len());
    print!("{}", hex_dump(stream, "  "));
    println!();

    let mut assembler = ApduAssembler::new();
    assembler.extend(stream);
    let mut index = 0;
    loop {
        match assembler.next_apdu() {
            Ok(Some(apdu)) => {
                index += 1;
                println!("  #{:<3} {}", index, apdu);
            }
            Ok(None) => break,
            Err(e) => println!("  !    {}", e),
        }
    }

    if assembler.buffered() > 0 {
        println!("  ({} trailing bytes waiting for more data)", assembler.buffered());
    }
    println!();
}

fn demo_goose_packet() -> Result<(), Box<dyn std::error::Error>> {
    println!("GOOSE Packet");
    println!("============");

    let dst = parse_mac_address("01:0C:CD:01:00:01")?;
    let src = parse_mac_address("00:11:22:33:44:55")?;
    let header = EtherHeader::new(dst, src, EtherType::Goose, 0x0001).with_vlan([0x81, 0x00, 0x80, 0x00]);

    let apdu = codec::encode_unnumbered(ControlFunction::TestActive);
    println!("  payload: {}", format_apdu_structure(&apdu));
    println!("  {} -> {}", format_mac_address(&src), format_mac_address(&dst));

    match pack(&header, &apdu) {
        Some(packet) => print!("{}", hex_dump(&packet, "  ")),
        None => println!("  packet rejected"),
    }
    Ok(())
}
