use std::io::Cursor;

use super::*;

#[test]
fn code_entry_keywords() {
    assert_eq!(parse_code_entry("resend\n"), CodeEntry::Resend);
    assert_eq!(parse_code_entry(" R "), CodeEntry::Resend);
    assert_eq!(parse_code_entry("quit"), CodeEntry::Quit);
    assert_eq!(parse_code_entry(" 1234 "), CodeEntry::Code("1234".to_owned()));
}

#[test]
fn ask_strips_line_endings() {
    let mut prompter = Prompter::new(Cursor::new("hello\r\nworld\n"));
    assert_eq!(prompter.ask("> ").unwrap(), "hello");
    assert_eq!(prompter.ask("> ").unwrap(), "world");
}

#[test]
fn ask_reports_closed_input() {
    let mut prompter = Prompter::new(Cursor::new(""));
    assert!(matches!(prompter.ask("> "), Err(CliError::InputClosed)));
}

#[test]
fn ask_code_parses_entry() {
    let mut prompter = Prompter::new(Cursor::new("resend\n4321\n"));
    assert_eq!(prompter.ask_code("otp: ").unwrap(), CodeEntry::Resend);
    assert_eq!(prompter.ask_code("otp: ").unwrap(), CodeEntry::Code("4321".to_owned()));
}

#[test]
fn choice_accepts_letters_and_numbers() {
    assert_eq!(parse_choice("b", 4), Some(1));
    assert_eq!(parse_choice(" C ", 4), Some(2));
    assert_eq!(parse_choice("1", 4), Some(0));
}

#[test]
fn choice_rejects_out_of_range_and_noise() {
    assert_eq!(parse_choice("e", 4), None);
    assert_eq!(parse_choice("0", 4), None);
    assert_eq!(parse_choice("5", 4), None);
    assert_eq!(parse_choice("", 4), None);
    assert_eq!(parse_choice("ab", 4), None);
}

#[test]
fn choice_labels_start_at_a() {
    assert_eq!(choice_label(0), 'a');
    assert_eq!(choice_label(3), 'd');
}

#[test]
fn ask_secret_reads_piped_input() {
    let mut prompter = Prompter::new(Cursor::new("s3cret\nagain\n"));
    assert_eq!(prompter.ask_secret("Password: ").unwrap(), "s3cret");
    assert_eq!(prompter.ask("> ").unwrap(), "again");
}

#[test]
fn ask_secret_reports_closed_input() {
    let mut prompter = Prompter::new(Cursor::new("")).hide_secrets(false);
    assert!(matches!(prompter.ask_secret("Password: "), Err(CliError::InputClosed)));
}
