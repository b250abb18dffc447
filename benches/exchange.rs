use criterion::{Criterion, criterion_group, criterion_main};
use seal_exchange::authority::CertificateAuthority;
use seal_exchange::common::config::CryptoConfig;
use seal_exchange::hybrid::{decrypt_message, encrypt_message, generate_symmetric_key};
use seal_exchange::integrity::hash_message;
use seal_exchange::keys::UserKeyBundle;
use seal_exchange::{PartyId, send_message, verify_message};
use std::hint::black_box;

fn bench_symmetric(c: &mut Criterion) {
    let key = generate_symmetric_key().unwrap();
    let plaintext = "x".repeat(1024);
    c.bench_function("AES-256-GCM encrypt 1KB", |b| {
        b.iter(|| encrypt_message(black_box(&plaintext), black_box(&key)).unwrap());
    });
    let encrypted = encrypt_message(&plaintext, &key).unwrap();
    c.bench_function("AES-256-GCM decrypt 1KB", |b| {
        b.iter(|| decrypt_message(black_box(&encrypted), black_box(&key)).unwrap());
    });
    c.bench_function("SHA-256 digest 1KB", |b| {
        b.iter(|| hash_message(black_box(&plaintext)));
    });
}

fn bench_exchange(c: &mut Criterion) {
    let config = CryptoConfig::default();
    let alice = UserKeyBundle::generate(&config).unwrap();
    let bob = UserKeyBundle::generate(&config).unwrap();
    let alice_cert = CertificateAuthority::default()
        .issue_certificate("alice", alice.signing_public_key())
        .unwrap();

    c.bench_function("send_message", |b| {
        b.iter(|| {
            send_message(
                black_box("ola"),
                PartyId::Alice,
                &alice,
                bob.encryption_public_key(),
                &alice_cert,
            )
            .unwrap()
        });
    });

    let message = send_message(
        "ola",
        PartyId::Alice,
        &alice,
        bob.encryption_public_key(),
        &alice_cert,
    )
    .unwrap();
    c.bench_function("verify_message", |b| {
        b.iter(|| verify_message(black_box(&message), &bob).unwrap());
    });
}

fn bench_keygen(c: &mut Criterion) {
    let config = CryptoConfig::default();
    let mut group = c.benchmark_group("keygen");
    group.sample_size(10);
    group.bench_function("UserKeyBundle::generate RSA-2048", |b| {
        b.iter(|| UserKeyBundle::generate(black_box(&config)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_symmetric, bench_exchange, bench_keygen);
criterion_main!(benches);
