//! Benchmarks for DEFLATE compression and decompression throughput.

use oxiflate::{Level, compress, decompress};

fn main() {
    let test_cases = vec![
        ("small_random", generate_random(1024)),
        ("medium_random", generate_random(64 * 1024)),
        ("large_random", generate_random(256 * 1024)),
        ("small_repeated", generate_repeated(1024)),
        ("medium_repeated", generate_repeated(64 * 1024)),
        ("large_repeated", generate_repeated(256 * 1024)),
        ("small_text", generate_text_like(1024)),
        ("medium_text", generate_text_like(64 * 1024)),
        ("large_text", generate_text_like(256 * 1024)),
    ];

    println!("DEFLATE Benchmarks");
    println!("==================\n");

    for (name, data) in &test_cases {
        println!("Test: {} ({} bytes)", name, data.len());

        for level in [Level::Fast, Level::Default, Level::Best] {
            let start = std::time::Instant::now();
            let packed = compress(data, level).unwrap();
            let compress_time = start.elapsed();

            let start = std::time::Instant::now();
            let unpacked = decompress(&packed).unwrap();
            let decompress_time = start.elapsed();

            let compress_mbps = data.len() as f64 / compress_time.as_secs_f64() / 1024.0 / 1024.0;
            let decompress_mbps =
                data.len() as f64 / decompress_time.as_secs_f64() / 1024.0 / 1024.0;
            let ratio = data.len() as f64 / packed.len() as f64;

            println!(
                "  {:8}: compress {:7.2} MB/s, decompress {:7.2} MB/s, {:.2}x ratio ({} bytes)",
                format!("{level:?}"),
                compress_mbps,
                decompress_mbps,
                ratio,
                packed.len()
            );

            // Sanity check
            assert_eq!(&unpacked, data);
        }
        println!();
    }
}

fn generate_random(size: usize) -> Vec<u8> {
    // Simple LCG random number generator
    let mut data = Vec::with_capacity(size);
    let mut seed = 12345u32;
    for _ in 0..size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((seed >> 16) as u8);
    }
    data
}

fn generate_repeated(size: usize) -> Vec<u8> {
    let pattern = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

fn generate_text_like(size: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"the", b"quick", b"brown", b"fox", b"jumps", b"over", b"lazy", b"dog",
    ];
    let mut data = Vec::with_capacity(size);
    let mut seed = 42u32;
    while data.len() < size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.extend_from_slice(words[(seed >> 16) as usize % words.len()]);
        data.push(b' ');
    }
    data.truncate(size);
    data
}
