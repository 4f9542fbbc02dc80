mod common;

use radio_core::config::DirectoryConfig;
use radio_core::directory::{pick_random, DirectoryClient};

#[tokio::test]
#[ignore = "hits the public radio-browser mirrors; run explicitly with --ignored --nocapture"]
async fn live_mirrors_answer_tag_and_name_queries() {
    let tag = common::env_or("LIVE_DIRECTORY_TAG", "gospel");
    let name = common::env_or("LIVE_DIRECTORY_NAME", "radio");
    let client = DirectoryClient::new(&DirectoryConfig::default()).unwrap();

    let top = client.top_by_tag(&tag, 12).await.unwrap();
    println!("top {}: {} stations", tag, top.len());
    for st in &top {
        println!("  {:<40} {}", st.display_name(), st.meta_line());
    }
    assert!(top.len() <= 12);

    let random = client.random_by_tag(&tag, 20).await.unwrap();
    assert!(random.iter().all(|s| s.is_playable()));
    if let Some(st) = pick_random(&random) {
        println!("surprise: {} -> {:?}", st.display_name(), st.stream_url());
    }

    let found = client.search_by_name(&name, 30).await.unwrap();
    println!("search {:?}: {} playable", name, found.len());
    assert!(found.iter().all(|s| s.is_playable()));
}
