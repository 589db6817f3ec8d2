// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Detection of the CSV dialect from the file contents.

const DELIMITER_CANDIDATES: [u8; 5] = [b',', b';', b'\t', b'|', b':'];

const QUOTE_CANDIDATES: [u8; 2] = [b'"', b'\''];

/// Maximum number of records that are inspected.
const SAMPLE_RECORDS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

#[must_use]
pub fn sniff(sample: &str) -> Dialect {
    let sample = sample.as_bytes();
    let quote = sniff_quote(sample);
    let delimiter = sniff_delimiter(sample, quote).unwrap_or(Dialect::default().delimiter);
    Dialect { delimiter, quote }
}

/// The quote character that most often encloses a field.
///
/// A field counts as quoted only if the closing quote on the same line is
/// followed by a delimiter or the end of the line. Ties keep `"`.
fn sniff_quote(sample: &[u8]) -> u8 {
    let mut best = (Dialect::default().quote, 0);
    for quote in QUOTE_CANDIDATES {
        let count = count_quoted_fields(sample, quote);
        if count > best.1 {
            best = (quote, count);
        }
    }
    best.0
}

fn count_quoted_fields(sample: &[u8], quote: u8) -> usize {
    let mut count = 0;
    let mut index = 0;
    while index < sample.len() {
        let opens_field = sample[index] == quote
            && (index == 0 || is_field_separator(sample[index - 1]));
        if opens_field {
            if let Some(len) = quoted_field_len(&sample[index + 1..], quote) {
                count += 1;
                index += 1 + len;
                continue;
            }
        }
        index += 1;
    }
    count
}

/// Length of the quoted contents including the closing quote.
///
/// Doubled quotes are escapes.
fn quoted_field_len(rest: &[u8], quote: u8) -> Option<usize> {
    let mut index = 0;
    while index < rest.len() {
        match rest[index] {
            b'\n' | b'\r' => return None,
            byte if byte == quote => {
                match rest.get(index + 1) {
                    Some(&next) if next == quote => {
                        index += 2;
                        continue;
                    }
                    Some(&next) if !is_field_separator(next) => return None,
                    _ => return Some(index + 1),
                }
            }
            _ => (),
        }
        index += 1;
    }
    None
}

fn is_field_separator(byte: u8) -> bool {
    matches!(byte, b'\n' | b'\r') || DELIMITER_CANDIDATES.contains(&byte)
}

/// The candidate that occurs equally often in every record.
///
/// Falls back to the candidate that occurs most often in the
/// first record if none is consistent.
fn sniff_delimiter(sample: &[u8], quote: u8) -> Option<u8> {
    let mut consistent: Option<(u8, usize)> = None;
    let mut most_frequent_in_header: Option<(u8, usize)> = None;
    for delimiter in DELIMITER_CANDIDATES {
        let counts = count_per_record(sample, delimiter, quote);
        let Some(&first) = counts.first() else {
            continue;
        };
        if first == 0 {
            continue;
        }
        if most_frequent_in_header.is_none_or(|(_, max)| first > max) {
            most_frequent_in_header = Some((delimiter, first));
        }
        if counts.iter().all(|&count| count == first)
            && consistent.is_none_or(|(_, max)| first > max)
        {
            consistent = Some((delimiter, first));
        }
    }
    consistent
        .or(most_frequent_in_header)
        .map(|(delimiter, _)| delimiter)
}

/// Count the unquoted occurrences of `delimiter` for each non-empty record.
///
/// Line breaks within quoted fields do not terminate a record.
fn count_per_record(sample: &[u8], delimiter: u8, quote: u8) -> Vec<usize> {
    let mut counts = Vec::with_capacity(SAMPLE_RECORDS);
    let mut in_quotes = false;
    let mut record_is_empty = true;
    let mut count = 0;
    for &byte in sample {
        if byte == quote {
            in_quotes = !in_quotes;
        } else if !in_quotes && matches!(byte, b'\n' | b'\r') {
            if !record_is_empty {
                counts.push(count);
                if counts.len() >= SAMPLE_RECORDS {
                    return counts;
                }
            }
            count = 0;
            record_is_empty = true;
            continue;
        } else if !in_quotes && byte == delimiter {
            count += 1;
        }
        record_is_empty = false;
    }
    if !record_is_empty {
        counts.push(count);
    }
    counts
}
