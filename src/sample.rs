//! Built-in sample dataset
//!
//! Six reels with hand-collected counters, used when no API payload is
//! available. Each one carries the presentation it is analysed with.

use crate::types::{AnalysisVariant, Metric, MetricRecord};
use chrono::NaiveDate;

struct SampleReel {
    id: &'static str,
    title: &'static str,
    permalink: &'static str,
    date: (i32, u32, u32),
    variant: AnalysisVariant,
    views: u64,
    likes: u64,
    comments: u64,
    shares: u64,
    saves: u64,
    accounts_reached: u64,
    accounts_engaged: u64,
    follows: u64,
}

const SAMPLE_REELS: [SampleReel; 6] = [
    SampleReel {
        id: "1",
        title: "POV: Le pides un lápiz al de sistemas",
        permalink: "https://www.instagram.com/p/DF_g4Y9MQKp/",
        date: (2024, 1, 15),
        variant: AnalysisVariant::ConversionFunnel,
        views: 874058,
        likes: 67380,
        comments: 172,
        shares: 16932,
        saves: 2092,
        accounts_reached: 605291,
        accounts_engaged: 78454,
        follows: 145,
    },
    SampleReel {
        id: "2",
        title: "Seguridad ante todo",
        permalink: "https://www.instagram.com/p/DICX4_TS2VQ/",
        date: (2024, 1, 12),
        variant: AnalysisVariant::ReachVsEngagement,
        views: 2806994,
        likes: 131919,
        comments: 78,
        shares: 15055,
        saves: 2164,
        accounts_reached: 1512344,
        accounts_engaged: 138970,
        follows: 175,
    },
    SampleReel {
        id: "3",
        title: "POV: Se te cae tu botella en San Gil",
        permalink: "https://www.instagram.com/p/DL0BtdVMXup/",
        date: (2024, 1, 10),
        variant: AnalysisVariant::ReachBreakdown,
        views: 1209592,
        likes: 70633,
        comments: 769,
        shares: 12757,
        saves: 1362,
        accounts_reached: 853531,
        accounts_engaged: 78034,
        follows: 732,
    },
    SampleReel {
        id: "4",
        title: "Qué prenda te daría pena traer a la U",
        permalink: "https://www.instagram.com/p/DDvl2vAskef/",
        date: (2024, 1, 8),
        variant: AnalysisVariant::InteractionMix,
        views: 778939,
        likes: 41559,
        comments: 239,
        shares: 6284,
        saves: 1419,
        accounts_reached: 514950,
        accounts_engaged: 45272,
        follows: 229,
    },
    SampleReel {
        id: "5",
        title: "POV: Te gradúas de ingeniero",
        permalink: "https://www.instagram.com/p/DKU5xY3OrLQ/",
        date: (2024, 1, 5),
        variant: AnalysisVariant::NicheEngagement,
        views: 404739,
        likes: 30947,
        comments: 32,
        shares: 8830,
        saves: 905,
        accounts_reached: 280806,
        accounts_engaged: 37283,
        follows: 68,
    },
    SampleReel {
        id: "6",
        title: "Mi última diapositiva",
        permalink: "https://www.instagram.com/p/DBcIQlMyzRN/",
        date: (2024, 1, 1),
        variant: AnalysisVariant::ViralComparison,
        views: 5500000,
        likes: 600000,
        comments: 1200,
        shares: 45000,
        saves: 8500,
        accounts_reached: 3200000,
        accounts_engaged: 598000,
        follows: 1150,
    },
];

/// The sample reels as metric records, newest first
pub fn sample_reels() -> Vec<MetricRecord> {
    SAMPLE_REELS.iter().map(to_record).collect()
}

fn to_record(reel: &SampleReel) -> MetricRecord {
    let (year, month, day) = reel.date;

    let mut record = MetricRecord::new(reel.id, reel.title)
        .with_variant(reel.variant)
        .with_count(Metric::Views, reel.views)
        .with_count(Metric::Likes, reel.likes)
        .with_count(Metric::Comments, reel.comments)
        .with_count(Metric::Shares, reel.shares)
        .with_count(Metric::Saves, reel.saves)
        .with_count(Metric::Follows, reel.follows)
        .with_count(Metric::AccountsReached, reel.accounts_reached)
        .with_count(Metric::AccountsEngaged, reel.accounts_engaged)
        // Profile activity equals follows throughout the collected data
        .with_count(Metric::ProfileActivity, reel.follows);

    if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        record = record.with_date(date);
    }
    record.permalink = Some(reel.permalink.to_string());
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_covers_every_variant_but_standard() {
        let reels = sample_reels();
        assert_eq!(reels.len(), 6);

        for variant in [
            AnalysisVariant::ConversionFunnel,
            AnalysisVariant::ReachVsEngagement,
            AnalysisVariant::ReachBreakdown,
            AnalysisVariant::InteractionMix,
            AnalysisVariant::NicheEngagement,
            AnalysisVariant::ViralComparison,
        ] {
            assert_eq!(reels.iter().filter(|r| r.variant == variant).count(), 1);
        }
    }

    #[test]
    fn test_sample_records_are_complete() {
        for reel in sample_reels() {
            for metric in Metric::CORE {
                assert!(reel.value(metric).is_some(), "{} missing {}", reel.id, metric);
            }
            assert!(reel.date.is_some());
            assert_eq!(reel.coverage, 1.0);
        }
    }
}
