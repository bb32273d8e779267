//! Line-oriented paging over an assembled build log.
//!
//! Non-negative offsets read forward from that line. Negative offsets count back from
//! the end, `-1` being a window that ends on the last line. A `next_offset` of `0` means
//! there is nothing left to read in the current direction, which cannot be told apart
//! from a request that legitimately starts at line `0`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogWindowRequest<'a> {
  pub log: &'a str,
  pub offset: i64,
  /// Must be greater than zero; callers validate before building a request.
  pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogWindowResult {
  #[serde(rename = "log_lines")]
  pub lines: String,
  #[serde(skip_serializing_if = "is_zero")]
  pub next_offset: i64,
  pub total_lines: i64,
}

impl LogWindowResult {
  pub fn has_more(&self) -> bool {
    self.next_offset != 0
  }
}

fn is_zero(value: &i64) -> bool {
  *value == 0
}

pub fn peek(request: LogWindowRequest<'_>) -> LogWindowResult {
  debug_assert!(request.limit > 0, "limit must be validated by the caller");
  let lines: Vec<&str> = request.log.split('\n').collect();
  let total = lines.len() as i64;

  if request.offset >= 0 {
    if request.offset >= total {
      return LogWindowResult {
        lines: String::new(),
        next_offset: 0,
        total_lines: total,
      };
    }
    let end = request.offset.saturating_add(request.limit).min(total);
    let next_offset = if end < total { end } else { 0 };
    return LogWindowResult {
      lines: lines[request.offset as usize..end as usize].join("\n"),
      next_offset,
      total_lines: total,
    };
  }

  // Offsets further back than the start of the log produce an empty window.
  let end = (total + request.offset + 1).clamp(0, total);
  let start = (end - request.limit).max(0);
  let mut next_offset = request.offset.saturating_sub(request.limit);
  if next_offset < -total {
    next_offset = 0;
  }
  LogWindowResult {
    lines: lines[start as usize..end as usize].join("\n"),
    next_offset,
    total_lines: total,
  }
}
