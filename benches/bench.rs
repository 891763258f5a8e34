// Criterion benchmarks for nest-match

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use nest_match::core::{Ranker, RecordNormalizer, distance::haversine_miles};
use nest_match::models::{
    Listing, ListingSource, PetPreference, Profile, RawProviderRecord, Role, SleepSchedule,
};
use serde_json::json;

const CITIES: [&str; 5] = ["Boston", "Cambridge", "Somerville", "Brookline", "Medford"];

fn create_candidate(id: usize) -> Profile {
    let mut profile = Profile::new(id.to_string(), if id % 2 == 0 { Role::Seeker } else { Role::Host });
    profile.locality = Some("Boston".to_string());
    profile.age = Some(20 + (id % 15) as u8);
    profile.budget_min = Some(900 + (id % 10) as u32 * 100);
    profile.budget_max = Some(1800 + (id % 10) as u32 * 100);
    profile.cleanliness = Some(1 + (id % 10) as u8);
    profile.sleep_schedule = Some(if id % 3 == 0 { SleepSchedule::Early } else { SleepSchedule::Late });
    profile.pets = Some(if id % 4 == 0 { PetPreference::No } else { PetPreference::Yes });
    profile
}

fn create_listing(id: usize) -> Listing {
    let offset = (id as f64 * 0.0007) % 0.1;
    Listing {
        id: id.to_string(),
        address: format!("{} Main St", id),
        city: CITIES[id % CITIES.len()].to_string(),
        state: "MA".to_string(),
        latitude: 42.30 + offset,
        longitude: -71.10 + offset,
        price: 1200 + (id % 20) as u32 * 100,
        bedrooms: Some(1 + (id % 3) as u32),
        bathrooms: Some(1.0),
        description: None,
        source: ListingSource::Provider,
    }
}

fn create_subject() -> Profile {
    let mut subject = Profile::new("subject", Role::Seeker);
    subject.locality = Some("Boston".to_string());
    subject.age = Some(26);
    subject.budget_min = Some(1500);
    subject.budget_max = Some(2400);
    subject.cleanliness = Some(7);
    subject.sleep_schedule = Some(SleepSchedule::Late);
    subject.pets = Some(PetPreference::Yes);
    subject
}

fn bench_haversine_miles(c: &mut Criterion) {
    c.bench_function("haversine_miles", |b| {
        b.iter(|| {
            haversine_miles(
                black_box(42.3601),
                black_box(-71.0589),
                black_box(42.3736),
                black_box(-71.1097),
            )
        });
    });
}

fn bench_rank_roommates(c: &mut Criterion) {
    let ranker = Ranker::with_default_weights();
    let subject = create_subject();

    let mut group = c.benchmark_group("rank_roommates");

    for candidate_count in [10, 100, 1000, 5000].iter() {
        let candidates: Vec<Profile> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| ranker.rank_roommates(black_box(&subject), black_box(&candidates), 0.5));
            },
        );
    }

    group.finish();
}

fn bench_rank_listings(c: &mut Criterion) {
    let ranker = Ranker::with_default_weights();
    let subject = create_subject();

    let mut group = c.benchmark_group("rank_listings");

    for listing_count in [14, 100, 1000].iter() {
        let listings: Vec<Listing> = (0..*listing_count).map(create_listing).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(listing_count),
            listing_count,
            |b, _| {
                b.iter(|| ranker.rank_listings(black_box(&subject), black_box(&listings), 0.3));
            },
        );
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = RecordNormalizer::default();
    let record: RawProviderRecord = serde_json::from_value(json!({
        "property_id": 4412,
        "address": "77 Beacon St",
        "city": "Boston",
        "state_code": "MA",
        "lat": "42.356",
        "lon": "-71.07",
        "prices": [{ "type": "sale", "amount": 899000 }, { "for_sale": false, "available": true, "amount": "$3,100 - $3,400" }],
        "tags": [{ "name": "Rent Estimate", "value": "$3,250" }],
        "descriptions": [
            { "text": "Older copy", "date": "2023-01-02" },
            { "text": "Sunny two bedroom near the Common", "date": "2024-06-11T10:00:00Z" }
        ]
    }))
    .unwrap_or_default();

    c.bench_function("normalize_record", |b| {
        b.iter(|| normalizer.normalize(black_box(&record)));
    });
}

criterion_group!(
    benches,
    bench_haversine_miles,
    bench_rank_roommates,
    bench_rank_listings,
    bench_normalize
);

criterion_main!(benches);
