/// Data layer: table model, loading, filtering, statistics and plot layout.
///
/// Architecture:
/// ```text
///   uploaded .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → RecordTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  which known columns exist
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  ordered stages → controls + surviving rows
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐  ┌──────────────┐
///   │ summary   │  │ distribution │  violin / strip / median scene
///   └──────────┘  └──────────────┘
///        │              │
///        └──────┬───────┘
///               ▼
///          ┌──────────┐
///          │  report   │  render(upload, selections)
///          └──────────┘
/// ```

pub mod distribution;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;
pub mod schema;
pub mod summary;
