// Copyright (C) 2024 Fred Clausen

// This program is free software; you can redistribute it and/or
// modify it under the terms of the GNU General Public License
// as published by the Free Software Foundation; either version 2
// of the License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301, USA

//! Bracketed numeric lists such as `[1.0,0.0,0.0,1.0]` or `(0.01,-0.02)`.

use custom_error::custom_error;

// matching brackets in the same order
const LEFT_BRACKETS: [char; 3] = ['[', '(', '{'];
const RIGHT_BRACKETS: [char; 3] = [']', ')', '}'];

custom_error! {pub ListError
    TooShort { list: String } = "error parsing bracketed list: cannot interpret {list}",
    Brackets { list: String } = "error parsing bracketed list: cannot find matching brackets in {list}",
    Value { value: String } = "error parsing bracketed list: cannot interpret {value}",
}

pub fn interpret_bracketed_list(list: &str) -> Result<Vec<f64>, ListError> {
    interpret_bracketed_list_with(list, ',')
}

/// Parse a bracketed list with a custom delimiter.
///
/// An empty list (`"[]"`) is accepted and yields no values. A single trailing delimiter
/// (`"[1,2,]"`) ends the list; any other empty field is an error.
pub fn interpret_bracketed_list_with(list: &str, delimiter: char) -> Result<Vec<f64>, ListError> {
    let mut chars = list.chars();
    let (first, last) = match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(ListError::TooShort {
                list: list.to_string(),
            })
        }
    };

    let matched = LEFT_BRACKETS
        .iter()
        .zip(RIGHT_BRACKETS.iter())
        .any(|(left, right)| first == *left && last == *right);
    if !matched {
        return Err(ListError::Brackets {
            list: list.to_string(),
        });
    }

    let inner = chars.as_str();
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    let mut fields: Vec<&str> = inner.split(delimiter).collect();
    if fields.len() > 1 && fields.last().map_or(false, |field| field.is_empty()) {
        fields.pop();
    }

    fields
        .into_iter()
        .map(|field| {
            field.trim().parse::<f64>().map_err(|_| ListError::Value {
                value: field.to_string(),
            })
        })
        .collect()
}
