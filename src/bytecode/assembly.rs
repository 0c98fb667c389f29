/*!
  The textual form of a program image. Each line holds at most one byte written as a base-2
  literal, optionally followed by a comment:

  ```text
  <line>    ::= <space>* <literal>? <space>* <comment>?
  <literal> ::= ('0b')? [01]+
  <comment> ::= '#' .*
  ```

  `<space>` is any Unicode whitespace, not only ASCII.

  Lines with no literal are skipped. Bytes are produced in the order they appear.
*/

use std::fs;
use std::path::Path;

use nom::{
  bytes::complete::{is_a, tag, take_while},
  character::complete::char as one_char,
  combinator::{all_consuming, opt, recognize, rest},
  sequence::{delimited, pair, preceded, terminated},
  IResult
};

use crate::error::LoadError;

fn space_p(input: &str) -> IResult<&str, &str> {
  take_while(char::is_whitespace)(input)
}

fn comment_p(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), rest)(input)
}

fn literal_p(input: &str) -> IResult<&str, &str> {
  recognize(pair(opt(tag("0b")), is_a("01")))(input)
}

/// Recognizes a single line, returning the literal text if there is one.
fn line_p(input: &str) -> IResult<&str, Option<&str>> {
  all_consuming(
    terminated(
      delimited(space_p, opt(literal_p), space_p),
      opt(comment_p)
    )
  )(input)
}

/// The part of a line before its comment, trimmed. Used to report bad lines.
fn code_text(line: &str) -> String {
  line.split('#').next().unwrap_or("").trim().to_string()
}

fn parse_literal(text: &str, line: usize) -> Result<u8, LoadError> {
  let digits = text.trim_start_matches("0b");
  // `is_a` guarantees only binary digits remain, so the only failure is width.
  u8::from_str_radix(digits, 2).map_err(|_e| LoadError::ValueOutOfRange {
    line,
    text: text.to_string()
  })
}

/// Parses a program image into the bytes to be loaded into memory. Line numbers in errors count
/// from 1.
pub fn parse_program(text: &str) -> Result<Vec<u8>, LoadError> {
  let mut program = Vec::new();

  for (idx, line) in text.lines().enumerate() {
    let line_number = idx + 1;
    match line_p(line) {
      Ok((_rest, Some(literal))) => {
        program.push(parse_literal(literal, line_number)?);
      }
      Ok((_rest, None)) => {}
      Err(_e) => {
        return Err(LoadError::InvalidLiteral {
          line: line_number,
          text: code_text(line)
        });
      }
    }
  }

  Ok(program)
}

/// Reads and parses the program image at `path`.
pub fn read_program<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, LoadError> {
  let path = path.as_ref();
  let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
    path: path.to_path_buf(),
    source
  })?;
  parse_program(&text)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn comments_blank_lines_and_whitespace(){
    let text = "# print8.ls8
10000010 # LDI R0,8
00000000

   00001000   \t
01000111 # PRN R0
00000000
00000001 # HLT
";
    assert_eq!(
      parse_program(text).unwrap(),
      vec![0b10000010, 0, 8, 0b01000111, 0, 1]
    );
  }

  #[test]
  fn comment_without_space(){
    assert_eq!(parse_program("00000001#HLT").unwrap(), vec![1]);
  }

  #[test]
  fn literals_may_be_short_or_prefixed(){
    assert_eq!(parse_program("1\n0b101\n0\r\n11111111").unwrap(), vec![1, 5, 0, 255]);
  }

  #[test]
  fn unicode_whitespace_is_trimmed(){
    let text = "\u{A0}10000010\u{A0}\n\u{3000}00000000 \u{2003}# R0\n\u{A0}\n00001000\u{2028}";
    assert_eq!(parse_program(text).unwrap(), vec![0b10000010, 0, 8]);
  }

  #[test]
  fn empty_image(){
    assert_eq!(parse_program("").unwrap(), Vec::<u8>::new());
    assert_eq!(parse_program("\n# nothing here\n   \n").unwrap(), Vec::<u8>::new());
  }

  #[test]
  fn invalid_literal_reports_line(){
    match parse_program("00000001\n10000002 # oops\n") {
      Err(LoadError::InvalidLiteral { line, text }) => {
        assert_eq!(line, 2);
        assert_eq!(text, "10000002");
      }
      other => panic!("unexpected result: {:?}", other)
    }
    assert!(matches!(
      parse_program("0000 0001"),
      Err(LoadError::InvalidLiteral { line: 1, .. })
    ));
  }

  #[test]
  fn wide_literal_is_out_of_range(){
    match parse_program("100000000") {
      Err(LoadError::ValueOutOfRange { line, text }) => {
        assert_eq!(line, 1);
        assert_eq!(text, "100000000");
      }
      other => panic!("unexpected result: {:?}", other)
    }
  }

  #[test]
  fn missing_file(){
    let result = read_program("/nonexistent/ls8/program.ls8");
    assert!(matches!(result, Err(LoadError::Io { .. })));
  }
}
