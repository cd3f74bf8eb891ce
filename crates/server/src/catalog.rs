use shared::domain::MatchRecord;

pub(crate) fn demo_recommendations() -> Vec<MatchRecord> {
    vec![
        MatchRecord::new(
            "The Starry Night",
            "Vincent van Gogh",
            "1889",
            "https://images.metmuseum.org/CRDImages/ep/original/DP-974-001.jpg",
        ),
        MatchRecord::new(
            "Water Lilies",
            "Claude Monet",
            "1919",
            "https://images.metmuseum.org/CRDImages/ep/original/DP-1506-001.jpg",
        ),
        MatchRecord::new(
            "The Persistence of Memory",
            "Salvador Dalí",
            "1931",
            "https://www.moma.org/media/W1siZiIsIjM4NjQ3MCJdLFsicCIsImNvbnZlcnQiLCItcXVhbGl0eSA5MCAtcmVzaXplIDIwMDB4MjAwMFx1MDAzZSJdXQ.jpg?sha=4c0635a9ee70d63e",
        ),
    ]
}
