//! dbin - Offline Self-Check
//!
//! Encode record contoh, hex dump frame-nya, decode balik, dan cocokkan
//! field-for-field. Untuk server/client demo lihat bin dbin_server dan
//! dbin_client.

use dbin::protocol::{decode, encode, Message, MessageType, MAGIC, VERSION};

fn dump_hex(buf: &[u8]) {
    for b in buf {
        print!("{b:02X} ");
    }
    println!();
}

fn main() {
    println!("dbin codec self-check");
    println!("=====================\n");

    let m = Message {
        magic: MAGIC,
        version: VERSION,
        msg_type: MessageType::Msg as u8,
        valid: true,
        is_room: true,
        reserved: 0,
        user_id: 5321,
        route: 77, // room id (karena is_room = true)
        msg_id: 42,
        msg_len: 2,
        payload: b"oi",
    };

    // ---- encode ----
    let mut out = [0u8; 128];
    let n = match encode(&m, &mut out) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("encode failed: {e}");
            std::process::exit(1);
        }
    };

    println!("Encoded {n} bytes:");
    dump_hex(&out[..n]);

    // ---- decode ----
    let d = match decode(&out[..n]) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("decode failed: {e}");
            std::process::exit(2);
        }
    };

    println!("\nDecoded:");
    println!(" magic    = 0x{:03X}", d.magic);
    println!(" version  = {}", d.version);
    println!(" type     = {}", d.msg_type);
    println!(" valid    = {}", d.valid);
    println!(" is_room  = {}", d.is_room);
    println!(" reserved = {}", d.reserved);
    println!(" user_id  = {}", d.user_id);
    println!(" route    = {}", d.route);
    println!(" msg_id   = {}", d.msg_id);
    println!(" msg_len  = {}", d.msg_len);
    match std::str::from_utf8(d.payload) {
        Ok(s) if !s.is_empty() => println!(" payload  = \"{s}\""),
        _ => println!(" payload  = <none>"),
    }

    if d == m {
        println!("\nResult: OK (roundtrip matched)");
    } else {
        println!("\nResult: FAIL (mismatch)");
        std::process::exit(3);
    }
}
