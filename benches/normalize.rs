use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tripflow_core::{PricingReconciler, StatusNormalizer};
use tripflow_domain::{BookingSnapshot, RawStatus, VoucherPreview};

fn sample_statuses() -> Vec<(RawStatus, Option<RawStatus>)> {
    let labels = [
        "PENDING_PAYMENT",
        "pending_deposit_payment",
        " WAITING_FOR_UPDATE ",
        "PURCHASED",
        "CONFIRMED",
        "1",
        "unknown-status",
        "BOOKING_SUCCESS_WAIT_FOR_CONFIRMED",
    ];
    let transactions = [None, Some("SUCCESS"), Some("PENDING"), Some("paid")];

    (0..10_000)
        .map(|idx| {
            let status = if idx % 5 == 0 {
                RawStatus::Code((idx % 4) as i64)
            } else {
                RawStatus::from(labels[idx % labels.len()])
            };
            let transaction = transactions[idx % transactions.len()].map(RawStatus::from);
            (status, transaction)
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let statuses = sample_statuses();

    c.bench_function("normalize_10k", |b| {
        b.iter(|| {
            for (status, transaction) in &statuses {
                black_box(StatusNormalizer::normalize(
                    Some(status),
                    transaction.as_ref(),
                ));
            }
        })
    });
}

fn bench_amount_due(c: &mut Criterion) {
    let bookings: Vec<BookingSnapshot> = sample_statuses()
        .into_iter()
        .enumerate()
        .map(|(idx, (status, _))| {
            BookingSnapshot::new(idx as i64, status).with_amounts(1000.0, 300.0, 300.0, 30.0)
        })
        .collect();
    let preview = VoucherPreview {
        final_remaining_amount: Some(650.0),
        ..VoucherPreview::default()
    };

    c.bench_function("amount_due_10k", |b| {
        b.iter(|| {
            for booking in &bookings {
                black_box(PricingReconciler::amount_due(booking, Some(&preview)));
            }
        })
    });
}

criterion_group!(benches, bench_normalize, bench_amount_due);
criterion_main!(benches);
