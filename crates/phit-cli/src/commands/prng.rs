use phit_core::PhitPrng;

pub fn run(count: usize, doubles: bool, bytes: Option<usize>) {
    let mut rng = PhitPrng::new();

    if let Some(len) = bytes {
        let mut buf = vec![0u8; len];
        rng.fill(&mut buf);
        for chunk in buf.chunks(32) {
            let line: String = chunk.iter().map(|b| format!("{b:02x}")).collect();
            println!("{line}");
        }
        return;
    }

    if doubles {
        for _ in 0..count {
            println!("{:.12}", rng.next_f64());
        }
    } else {
        for _ in 0..count {
            println!("0x{:016X}", rng.next_u64());
        }
    }

    log::debug!(
        "generated {} values, ~{} phits consumed",
        rng.generated(),
        rng.bits_collected()
    );
}
