use hosted_provider_hub::bench_support::SelectionBenchFixture;
use hosted_provider_selector::channel::{ChannelType, ProviderId};

#[test]
fn test_fixture_seeds_current_month_usage() {
    let fixture = SelectionBenchFixture::new("fixture-env", ChannelType::Sms, 25)
        .expect("fixture should build");

    let usage = fixture
        .selector
        .hosted_usage(&fixture.environment_id, ChannelType::Sms, chrono::Utc::now())
        .expect("usage should be counted");
    assert_eq!(usage, 25);

    let provider = fixture
        .selector
        .select(&fixture.command(ChannelType::Sms))
        .expect("fixture limits never trip");
    assert_eq!(provider, Some(ProviderId::NovuSms));
}
