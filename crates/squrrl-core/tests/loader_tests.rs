use std::fs;

use tempfile::TempDir;

use squrrl_core::config::BaseConfig;
use squrrl_core::lang::WhatlangDetector;
use squrrl_core::loader::{count_lines, load_data};
use squrrl_core::traits::LanguageDetector;
use squrrl_core::Error;

struct AcceptAll;

impl LanguageDetector for AcceptAll {
    fn is_english(&self, _text: &str) -> bool { true }
}

fn write_dump(dir: &std::path::Path) {
    fs::write(
        dir.join("author_key.txt"),
        "[/authors/OL1A,Jane,Doe]\n[/authors/OL2A,Roe, John]\n[/authors/OL3A,Nobody]\n",
    )
    .unwrap();
    let works = [
        r#"{"title":"First","authors":[{"author":{"key":"/authors/OL2A"}}],"description":"First description."}"#,
        r#"{"title":"No author","authors":[{"type":"x"}],"description":"Orphan."}"#,
        r#"{"title":"Second","authors":[{"key":"/authors/OL1A"}],"description":{"value":"Second\ndescription."}}"#,
        r#"{"title":"Third","authors":[{"author":{"key":"/authors/OL9A"}}],"description":"Lost author."}"#,
    ];
    fs::write(dir.join("works_with_desc.txt"), works.join("\n") + "\n").unwrap();
}

#[test]
fn load_data_joins_books_to_authors() {
    let tmp = TempDir::new().unwrap();
    write_dump(tmp.path());
    let config = BaseConfig::new(tmp.path().to_string_lossy());

    let loaded = load_data(&config, &AcceptAll).expect("load");

    assert_eq!(loaded.authors.len(), 3);
    assert_eq!(loaded.authors.find_by_reference("/authors/OL2A").unwrap().name, "Roe, John");
    let summary: Vec<(u64, &str, u64)> = loaded.books.iter().map(|b| (b.id, b.title.as_str(), b.author.id)).collect();
    assert_eq!(summary, vec![(0, "First", 1), (2, "Second", 0)]);
    assert_eq!(loaded.books[1].description, "Second description.");
    assert_eq!(loaded.stats.total, 4);
    assert_eq!(loaded.stats.no_author_key, 1);
    assert_eq!(loaded.stats.unknown_author, 1);
}

#[test]
fn load_data_honours_custom_file_names() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), "[/authors/OL1A,Jane]\n").unwrap();
    fs::write(
        tmp.path().join("w.txt"),
        r#"{"title":"T","authors":[{"key":"/authors/OL1A"}],"description":"D"}"#,
    )
    .unwrap();
    let mut config = BaseConfig::new(tmp.path().to_string_lossy());
    config.author_file = "a.txt".to_string();
    config.works_file = "w.txt".to_string();

    let loaded = load_data(&config, &AcceptAll).expect("load");
    assert_eq!(loaded.books.len(), 1);
}

#[test]
fn load_data_filters_non_english_descriptions() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("author_key.txt"), "[/authors/OL1A,Jane]\n").unwrap();
    let works = [
        r#"{"title":"Sea","authors":[{"key":"/authors/OL1A"}],"description":"A young sailor leaves his village and spends many years travelling across the ocean, learning about the people he meets and the places he visits along the way."}"#,
        r#"{"title":"Meer","authors":[{"key":"/authors/OL1A"}],"description":"Ein junger Seemann verlässt sein Dorf und verbringt viele Jahre damit, über den Ozean zu reisen und die Menschen kennenzulernen, denen er unterwegs begegnet."}"#,
    ];
    fs::write(tmp.path().join("works_with_desc.txt"), works.join("\n")).unwrap();
    let config = BaseConfig::new(tmp.path().to_string_lossy());

    let loaded = load_data(&config, &WhatlangDetector::new()).expect("load");
    let titles: Vec<&str> = loaded.books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Sea"]);
    assert_eq!(loaded.stats.non_english, 1);
    assert_eq!(loaded.stats.failures(), 0);
}

#[test]
fn missing_source_file_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let config = BaseConfig::new(tmp.path().to_string_lossy());
    assert!(matches!(load_data(&config, &AcceptAll), Err(Error::Io { .. })));
}

#[test]
fn count_lines_matches_line_iterator() {
    let tmp = TempDir::new().unwrap();
    let p = tmp.path().join("f.txt");
    fs::write(&p, "a\nb\nc\n").unwrap();
    assert_eq!(count_lines(&p).unwrap(), 3);
    fs::write(&p, "a\nb").unwrap();
    assert_eq!(count_lines(&p).unwrap(), 2);
}
