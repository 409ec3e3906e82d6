//! End-to-end tests: raw messages through parsing, aggregation and scoring

use spam_rs::config::ClassifierConfig;
use spam_rs::dataset::{self, IndexEntry};
use spam_rs::eval;
use spam_rs::{CorpusAggregator, EmailParser, FeatureRecord, Label, NaiveBayesModel};
use std::fs;
use tempfile::TempDir;

const HAM_1: &str = "\
Received: from mail.example.org (mail.example.org [192.168.1.10])
Date: Tue, 3 Apr 2007 09:15:00 -0400
Subject: Team lunch

Are we still on for lunch tomorrow? The meeting agenda is attached.
";

const HAM_2: &str = "\
Received: from mail.example.org (mail.example.org [192.168.1.10])
Date: Wed, 4 Apr 2007 10:01:12 -0400
Subject: Re: agenda

Thanks, I updated the agenda for the project meeting.
";

const SPAM_1: &str = "\
Received: from unknown (HELO relay) ([203.0.113.7])
Date: Sat, 7 Apr 2007 03:44:10 +0000
Subject: You WIN!!!

WIN cash now!!! Visit http://cheap-pills.example.com/buy?id=1 or mail deals@cheap.example.com
";

const SPAM_2: &str = "\
Received: from unknown ([203.0.113.7])
Date: Sun, 8 Apr 2007 03:02:55 +0000
Subject: cheap pills

Cheap pills, win big cash $$$ http://cheap-pills.example.com
";

fn parse_labeled(parser: &EmailParser, raw: &str, label: Label) -> FeatureRecord {
    parser.parse(raw.as_bytes()).with_label(label)
}

fn training_set(parser: &EmailParser) -> Vec<FeatureRecord> {
    vec![
        parse_labeled(parser, HAM_1, Label::Ham),
        parse_labeled(parser, HAM_2, Label::Ham),
        parse_labeled(parser, SPAM_1, Label::Spam),
        parse_labeled(parser, SPAM_2, Label::Spam),
    ]
}

#[test]
fn test_parse_extracts_headers_and_normalizes_body() {
    let parser = EmailParser::new().unwrap();
    let record = parser.parse(SPAM_1.as_bytes());

    assert_eq!(record.ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(record.hour.as_deref(), Some("03"));
    assert_eq!(record.tokens.count("win"), 1);
    assert_eq!(record.tokens.count("[URL]"), 1);
    assert_eq!(record.tokens.count("[EMAIL]"), 1);
    assert_eq!(record.tokens.count("subject"), 0);
    assert!(record.label.is_none());
}

#[test]
fn test_train_and_classify() {
    let parser = EmailParser::new().unwrap();
    let stats = CorpusAggregator::aggregate(&training_set(&parser)).unwrap();
    let model = NaiveBayesModel::new(stats, ClassifierConfig::default()).unwrap();

    let spammy = parser.parse(b"Subject: hi\n\nwin cheap cash now");
    let hammy = parser.parse(b"Subject: hi\n\nmeeting agenda for lunch");

    assert_eq!(model.classify(&spammy), Label::Spam);
    assert_eq!(model.classify(&hammy), Label::Ham);
}

#[test]
fn test_ip_channel_flips_decision() {
    let parser = EmailParser::new().unwrap();
    let ham = parser
        .parse(b"Received: from a ([10.0.0.1])\n\nhello there")
        .with_label(Label::Ham);
    let spam = parser
        .parse(b"Received: from b ([10.0.0.2])\n\nhello there")
        .with_label(Label::Spam);
    let stats = CorpusAggregator::aggregate([&ham, &spam]).unwrap();

    let query = parser.parse(b"Received: from b ([10.0.0.2])\n\nhello there");

    let without_ip = NaiveBayesModel::new(stats.clone(), ClassifierConfig::default()).unwrap();
    assert_eq!(without_ip.classify(&query), Label::Ham);

    let config = ClassifierConfig {
        use_ip: true,
        ..ClassifierConfig::default()
    };
    let with_ip = NaiveBayesModel::new(stats, config).unwrap();
    assert_eq!(with_ip.classify(&query), Label::Spam);
}

#[test]
fn test_hour_channel_flips_decision() {
    let parser = EmailParser::new().unwrap();
    let ham = parser
        .parse(b"Date: Mon, 2 Apr 2007 09:12:00 -0400\n\nhello there")
        .with_label(Label::Ham);
    let spam = parser
        .parse(b"Date: Mon, 2 Apr 2007 03:12:00 +0000\n\nhello there")
        .with_label(Label::Spam);
    let stats = CorpusAggregator::aggregate([&ham, &spam]).unwrap();

    let query = parser.parse(b"Date: Fri, 6 Apr 2007 03:59:59 +0000\n\nhello there");
    assert_eq!(query.hour.as_deref(), Some("03"));

    let without_time = NaiveBayesModel::new(stats.clone(), ClassifierConfig::default()).unwrap();
    assert_eq!(without_time.classify(&query), Label::Ham);

    let config = ClassifierConfig {
        use_time: true,
        ..ClassifierConfig::default()
    };
    let with_time = NaiveBayesModel::new(stats.clone(), config).unwrap();
    assert_eq!(with_time.classify(&query), Label::Spam);

    // The IP channel has nothing to say about these messages
    let config = ClassifierConfig {
        use_ip: true,
        ..ClassifierConfig::default()
    };
    let with_ip = NaiveBayesModel::new(stats, config).unwrap();
    assert_eq!(with_ip.classify(&query), Label::Ham);
}

#[test]
fn test_parallel_aggregation_matches_sequential() {
    let parser = EmailParser::new().unwrap();
    let records: Vec<FeatureRecord> = training_set(&parser)
        .into_iter()
        .cycle()
        .take(64)
        .collect();

    let sequential = CorpusAggregator::aggregate(&records).unwrap();
    let parallel = CorpusAggregator::aggregate_parallel(&records).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_shared_model_across_threads() {
    let parser = EmailParser::new().unwrap();
    let stats = CorpusAggregator::aggregate(&training_set(&parser)).unwrap();
    let config = ClassifierConfig {
        use_ip: true,
        use_time: true,
        ..ClassifierConfig::default()
    };
    let model = NaiveBayesModel::new(stats, config).unwrap();
    let query = parser.parse(SPAM_2.as_bytes());

    assert!(!model.is_precomputed());

    let results: Vec<Label> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| model.classify(&query)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(model.is_precomputed());
    let expected = model.classify(&query);
    assert!(results.iter().all(|&label| label == expected));
}

#[test]
fn test_statistics_survive_json() {
    let parser = EmailParser::new().unwrap();
    let stats = CorpusAggregator::aggregate(&training_set(&parser)).unwrap();

    let json = serde_json::to_string(&stats).unwrap();
    let restored: spam_rs::CorpusStatistics = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.label_counts, stats.label_counts);
    assert_eq!(restored.global_token_counts, stats.global_token_counts);
    assert_eq!(restored.label_ip_counts, stats.label_ip_counts);
    assert_eq!(restored.idf.len(), stats.idf.len());

    let query = parser.parse(SPAM_1.as_bytes());
    let a = NaiveBayesModel::new(stats, ClassifierConfig::default()).unwrap();
    let b = NaiveBayesModel::new(restored, ClassifierConfig::default()).unwrap();
    assert_eq!(a.classify(&query), b.classify(&query));
}

#[test]
fn test_corpus_on_disk() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();

    let messages = [
        ("inmail.1", HAM_1, "ham"),
        ("inmail.2", SPAM_1, "spam"),
        ("inmail.3", HAM_2, "ham"),
        ("inmail.4", SPAM_2, "spam"),
    ];
    let mut index = String::new();
    for (name, body, label) in messages {
        fs::write(data.join(name), body).unwrap();
        index.push_str(&format!("{} ../data/{}\n", label, name));
    }
    let full = dir.path().join("full");
    fs::create_dir(&full).unwrap();
    fs::write(full.join("index"), index).unwrap();

    let entries: Vec<IndexEntry> = dataset::load_index(&full.join("index")).unwrap();
    assert_eq!(entries.len(), 4);

    let parser = EmailParser::new().unwrap();
    let records = dataset::load_records(&entries, &parser).unwrap();
    let stats = CorpusAggregator::aggregate_parallel(&records).unwrap();
    assert_eq!(stats.total_documents, 4);
    assert_eq!(stats.label_count(Label::Spam), 2);

    let model = NaiveBayesModel::new(stats, ClassifierConfig::default()).unwrap();
    let evaluation = eval::evaluate(&model, &records).unwrap();
    assert_eq!(evaluation.confusion.total(), 4);
    assert_eq!(evaluation.accuracy, 1.0);
}
