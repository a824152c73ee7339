use crate::token::{DateReference, ParameterError, Token};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Template {
    tokens: Vec<Token>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("トークン {token_index} を描画できません: {source}")]
pub struct TemplateError {
    pub token_index: usize,
    #[source]
    pub source: ParameterError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("テンプレートが空です")]
    Empty,
    #[error("中括弧の対応が不正です")]
    UnbalancedBraces,
    #[error("未対応トークンです: {0}")]
    UnknownToken(String),
    #[error("トークン引数が不正です: {0}")]
    InvalidArgument(String),
}

impl Template {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        for (token_index, token) in self.tokens.iter().enumerate() {
            token
                .validate()
                .map_err(|source| TemplateError {
                    token_index,
                    source,
                })?;
        }
        Ok(())
    }
}

pub fn validate_template(input: &str) -> Result<(), ParseError> {
    parse_template(input).map(|_| ())
}

pub fn parse_template(input: &str) -> Result<Template, ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal {
                        text: std::mem::take(&mut literal),
                    });
                }
                let mut body = String::new();
                let mut found_close = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        found_close = true;
                        break;
                    }
                    if next == '{' {
                        return Err(ParseError::UnbalancedBraces);
                    }
                    body.push(next);
                }
                if !found_close || body.is_empty() {
                    return Err(ParseError::UnbalancedBraces);
                }
                tokens.push(parse_braced(&body)?);
            }
            '}' => return Err(ParseError::UnbalancedBraces),
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal { text: literal });
    }

    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(Template::new(tokens))
}

pub fn format_template(template: &Template) -> String {
    let mut out = String::new();
    for token in template.tokens() {
        match token {
            Token::Literal { text } => out.push_str(text),
            Token::Number {
                min_digits,
                init,
                gain,
            } => out.push_str(&format!("{{num:{min_digits}:{init}:{gain}}}")),
            Token::DateFormat { pattern, reference } => {
                let name = match reference {
                    DateReference::Now => "date",
                    DateReference::FileMtime => "mtime",
                };
                out.push_str(&format!("{{{name}:{pattern}}}"));
            }
            Token::OriginalName { strip_extension } => {
                out.push_str(if *strip_extension { "{orig}" } else { "{orig.ext}" });
            }
        }
    }
    out
}

fn parse_braced(body: &str) -> Result<Token, ParseError> {
    let (name, args) = match body.split_once(':') {
        Some((name, rest)) => (name, Some(rest)),
        None => (body, None),
    };

    match name {
        "num" => parse_number(body, args),
        "date" => parse_date(body, args, DateReference::Now),
        "mtime" => parse_date(body, args, DateReference::FileMtime),
        "orig" if args.is_none() => Ok(Token::OriginalName {
            strip_extension: true,
        }),
        "orig.ext" if args.is_none() => Ok(Token::OriginalName {
            strip_extension: false,
        }),
        _ => Err(ParseError::UnknownToken(body.to_string())),
    }
}

fn parse_number(body: &str, args: Option<&str>) -> Result<Token, ParseError> {
    let mut min_digits = 4usize;
    let mut init = 1i64;
    let mut gain = 1i64;

    if let Some(args) = args {
        let fields: Vec<&str> = args.split(':').collect();
        if fields.len() > 3 {
            return Err(ParseError::InvalidArgument(body.to_string()));
        }
        let invalid = || ParseError::InvalidArgument(body.to_string());
        if let Some(raw) = fields.first() {
            min_digits = raw.parse().map_err(|_| invalid())?;
        }
        if let Some(raw) = fields.get(1) {
            init = raw.parse().map_err(|_| invalid())?;
        }
        if let Some(raw) = fields.get(2) {
            gain = raw.parse().map_err(|_| invalid())?;
        }
    }

    Ok(Token::Number {
        min_digits,
        init,
        gain,
    })
}

fn parse_date(body: &str, args: Option<&str>, reference: DateReference) -> Result<Token, ParseError> {
    let pattern = args.unwrap_or_default();
    if pattern.is_empty() {
        return Err(ParseError::InvalidArgument(body.to_string()));
    }
    Ok(Token::DateFormat {
        pattern: pattern.to_string(),
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_template_splits_literals_and_tokens() {
        let template = parse_template("{num:3:4:2}_{orig}").expect("must parse");
        assert_eq!(
            template.tokens(),
            &[
                Token::Number {
                    min_digits: 3,
                    init: 4,
                    gain: 2,
                },
                Token::Literal {
                    text: "_".to_string(),
                },
                Token::OriginalName {
                    strip_extension: true,
                },
            ]
        );
    }

    #[test]
    fn parse_template_applies_number_defaults() {
        let template = parse_template("{num}").expect("must parse");
        assert_eq!(
            template.tokens(),
            &[Token::Number {
                min_digits: 4,
                init: 1,
                gain: 1,
            }]
        );
    }

    #[test]
    fn parse_template_accepts_partial_number_arguments() {
        let template = parse_template("{num:2:10}").expect("must parse");
        assert_eq!(
            template.tokens(),
            &[Token::Number {
                min_digits: 2,
                init: 10,
                gain: 1,
            }]
        );
    }

    #[test]
    fn parse_template_keeps_colons_inside_date_pattern() {
        let template = parse_template("{date:%H:%M:%S}").expect("must parse");
        assert_eq!(
            template.tokens(),
            &[Token::DateFormat {
                pattern: "%H:%M:%S".to_string(),
                reference: DateReference::Now,
            }]
        );
    }

    #[test]
    fn parse_template_maps_mtime_to_file_reference() {
        let template = parse_template("{mtime:%Y%m%d}_{orig.ext}").expect("must parse");
        assert_eq!(
            template.tokens(),
            &[
                Token::DateFormat {
                    pattern: "%Y%m%d".to_string(),
                    reference: DateReference::FileMtime,
                },
                Token::Literal {
                    text: "_".to_string(),
                },
                Token::OriginalName {
                    strip_extension: false,
                },
            ]
        );
    }

    #[test]
    fn parse_template_rejects_unknown_token() {
        let err = parse_template("{foo}").expect_err("must fail");
        assert!(matches!(err, ParseError::UnknownToken(_)));
    }

    #[test]
    fn parse_template_rejects_unbalanced_braces() {
        assert_eq!(
            parse_template("{num").expect_err("must fail"),
            ParseError::UnbalancedBraces
        );
        assert_eq!(
            parse_template("num}").expect_err("must fail"),
            ParseError::UnbalancedBraces
        );
    }

    #[test]
    fn parse_template_rejects_empty_input() {
        assert_eq!(parse_template("").expect_err("must fail"), ParseError::Empty);
    }

    #[test]
    fn parse_template_rejects_bad_number_arguments() {
        let err = parse_template("{num:x}").expect_err("must fail");
        assert!(matches!(err, ParseError::InvalidArgument(_)));
        let err = parse_template("{num:1:2:3:4}").expect_err("must fail");
        assert!(matches!(err, ParseError::InvalidArgument(_)));
    }

    #[test]
    fn parse_template_rejects_empty_date_pattern() {
        let err = parse_template("{date}").expect_err("must fail");
        assert!(matches!(err, ParseError::InvalidArgument(_)));
        let err = parse_template("{date:}").expect_err("must fail");
        assert!(matches!(err, ParseError::InvalidArgument(_)));
    }

    #[test]
    fn format_template_inverts_parse() {
        let input = "IMG-{num:3:4:2}_{date:%Y-%m-%d}_{mtime:%H%M}_{orig}{orig.ext}";
        let template = parse_template(input).expect("must parse");
        assert_eq!(format_template(&template), input);
    }

    #[test]
    fn validate_flags_offending_token_index() {
        let template = Template::new(vec![
            Token::Literal {
                text: "a".to_string(),
            },
            Token::DateFormat {
                pattern: "%Y%".to_string(),
                reference: DateReference::Now,
            },
        ]);
        let err = template.validate().expect_err("must fail");
        assert_eq!(err.token_index, 1);
        assert_eq!(err.source, ParameterError::TrailingPercent);
    }
}
