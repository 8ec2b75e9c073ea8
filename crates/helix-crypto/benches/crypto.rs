use helix_crypto::{decrypt, derive_key_from_password, encrypt, generate_key};
use secrecy::SecretString;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let key = generate_key();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt(divan::black_box(&data), divan::black_box(&key)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let key = generate_key();
    let envelope = encrypt(&make_data(size), &key).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt(divan::black_box(&envelope), divan::black_box(&key)).unwrap());
}

#[divan::bench(args = [1000, 100_000])]
fn bench_pbkdf2(bencher: divan::Bencher, iterations: u32) {
    let password = SecretString::from("correct horse battery staple");
    let salt = [7u8; 16];
    bencher.bench(|| {
        derive_key_from_password(divan::black_box(&password), &salt, iterations).unwrap()
    });
}

fn main() {
    divan::main();
}
