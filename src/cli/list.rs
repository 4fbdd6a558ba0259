//! `journey list`: print the timeline.

use crate::server::{build_object_store, load_config, open_store};
use anyhow::Context;
use journey_core::MemoryWorkflow;
use journey_store::{MemoryFilter, MemoryOrder, MemoryWithMedia, ObjectStore, UserId};

pub async fn run(order: MemoryOrder, owner: Option<String>) -> anyhow::Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    let store = open_store(&config).await?;
    let objects = build_object_store(&config)?;
    let workflow = MemoryWorkflow::new(store, objects.store);

    let filter = MemoryFilter {
        user_id: owner.map(UserId::new),
    };
    let timeline = workflow
        .list(&filter, order)
        .await
        .context("Failed to read timeline")?;

    if timeline.is_empty() {
        println!("No memories yet.");
        return Ok(());
    }
    for record in &timeline {
        print!("{}", render(record, workflow.objects().as_ref()));
    }
    Ok(())
}

fn render(record: &MemoryWithMedia, objects: &dyn ObjectStore) -> String {
    let memory = &record.memory;
    let mut out = format!(
        "#{} {}  {}{}\n",
        memory.id,
        memory.display_date(),
        memory
            .emoji
            .as_deref()
            .map(|e| format!("{e} "))
            .unwrap_or_default(),
        memory.title
    );
    if let Some(location) = &memory.location {
        out.push_str(&format!("    📍 {location}\n"));
    }
    out.push_str(&format!("    {}\n", memory.description));
    for item in &record.media {
        out.push_str(&format!(
            "    [{}] {}\n",
            item.kind,
            objects.public_url(&item.url)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use journey_store::{LocalObjectStore, MediaId, MediaItem, MediaKind, Memory, MemoryId};

    #[test]
    fn test_render() {
        let dir = tempfile::tempdir().unwrap();
        let objects = LocalObjectStore::new(dir.path(), "memories", "http://localhost:3000").unwrap();
        let record = MemoryWithMedia {
            memory: Memory {
                id: MemoryId(3),
                title: "Trip".into(),
                description: "Fun".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                location: Some("Paris".into()),
                emoji: Some("✈️".into()),
                created_at: Utc::now(),
                user_id: UserId::new("u1"),
            },
            media: vec![MediaItem {
                id: MediaId(1),
                memory_id: MemoryId(3),
                url: "3/1-abc.jpg".into(),
                kind: MediaKind::Image,
                order_index: Some(0),
                created_at: Utc::now(),
                user_id: UserId::new("u1"),
            }],
        };

        let text = render(&record, &objects);
        assert!(text.starts_with("#3 January 1, 2024  ✈️ Trip\n"));
        assert!(text.contains("📍 Paris"));
        assert!(text.contains(
            "[image] http://localhost:3000/storage/v1/object/public/memories/3/1-abc.jpg"
        ));
    }
}
