use subtitler::error::SubtitlerError;
use subtitler::subtitle::{format_timestamp, format_transcript, write_outputs, OutputFormat, Segment};
use tempfile::TempDir;

fn transcript(count: usize) -> Vec<Segment> {
    (0..count)
        .map(|i| {
            let start = i as f64 * 2.5;
            Segment::new(start, start + 2.0, format!("line {}", i + 1))
        })
        .collect()
}

#[test]
fn txt_has_one_separator_between_segments() {
    for n in 1..6 {
        let txt = format_transcript(&transcript(n), "txt").unwrap();
        assert_eq!(txt.matches('\n').count(), n - 1);
        assert!(!txt.ends_with('\n'));
    }
}

#[test]
fn srt_entries_are_numbered_in_order() {
    let srt = format_transcript(&transcript(4), "srt").unwrap();
    let entries: Vec<&str> = srt.split("\n\n").collect();

    assert_eq!(entries.len(), 4);
    for (i, entry) in entries.iter().enumerate() {
        let mut lines = entry.lines();
        assert_eq!(lines.next(), Some((i + 1).to_string().as_str()));
        assert!(lines.next().unwrap().contains(" --> "));
        assert_eq!(lines.next(), Some(format!("line {}", i + 1).as_str()));
    }
}

#[test]
fn vtt_always_starts_with_header() {
    for n in [0, 1, 3] {
        let vtt = format_transcript(&transcript(n), "vtt").unwrap();
        assert!(vtt.starts_with("WEBVTT\n\n"));
    }
    let vtt = format_transcript(&transcript(1), "vtt").unwrap();
    assert_eq!(vtt, "WEBVTT\n\n0:00:00,000 --> 0:00:02,000\nline 1\n");
}

#[test]
fn tsv_has_header_and_one_row_per_segment() {
    for n in [0, 1, 5] {
        let tsv = format_transcript(&transcript(n), "tsv").unwrap();
        let rows: Vec<&str> = tsv.split('\n').collect();
        assert_eq!(rows[0], "start\tend\ttext");
        assert_eq!(rows.len(), n + 1);
        assert!(rows[1..].iter().all(|row| row.split('\t').count() == 3));
    }
}

#[test]
fn long_recordings_get_wide_hours() {
    assert_eq!(format_timestamp(3600.0 * 12.0 + 0.25), "12:00:00,250");
}

#[test]
fn bogus_format_is_rejected_for_every_transcript() {
    for n in [0, 2] {
        let err = format_transcript(&transcript(n), "bogus").unwrap_err();
        assert!(matches!(err, SubtitlerError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("Unsupported output format 'bogus'"));
    }
}

#[test]
fn every_format_has_a_distinct_extension() {
    let extensions: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.extension()).collect();
    assert_eq!(extensions, vec!["txt", "json", "srt", "vtt", "tsv"]);
}

#[tokio::test]
async fn write_outputs_is_all_or_nothing() {
    let dir = TempDir::new().unwrap();

    let err = write_outputs(&transcript(2), &["srt", "docx"], dir.path(), "talk")
        .await
        .unwrap_err();
    assert!(matches!(err, SubtitlerError::UnsupportedFormat(_)));
    assert!(!dir.path().join("talk.srt").exists());

    let written = write_outputs(&transcript(2), &["srt", "json"], dir.path(), "talk")
        .await
        .unwrap();
    assert_eq!(written, vec![dir.path().join("talk.srt"), dir.path().join("talk.json")]);
}
