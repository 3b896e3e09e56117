// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod bookings_csv_datasource;
        pub(crate) mod grid_config_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod cell_value_model;
        pub(crate) mod grid_config_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod csv_rows_repository_impl;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod booking_period;
        pub(crate) mod column_filter;
        pub(crate) mod grid_config;
        pub(crate) mod imported_record;
        pub(crate) mod row;
        pub(crate) mod row_edit;
    }
    pub(crate) mod logic {
        pub(crate) mod column_sort;
        pub(crate) mod duplicate_detector;
        pub(crate) mod grid_engine;
        pub(crate) mod period_parser;
        mod utils;
    }
    pub(crate) mod repositories {
        pub(crate) mod rows_repository;
    }
    pub(crate) mod usecases {
        pub(crate) mod refresh_usecase;
    }
}

pub(crate) mod presentation {
    pub(crate) mod cell_fmt;
    pub(crate) mod grid_export;
    pub(crate) mod period_fmt;
}

// Public exports.
// ---

#[doc(hidden)]
#[allow(unused_imports)]
pub mod exports {
    // This mod represents how clients see the library, and can differ from the
    // internal structure.
    //
    // The contents of this mod are re-exported in the root of the crate.

    pub mod entities {
        pub use crate::domain::entities::booking_period::*;
        pub use crate::domain::entities::column_filter::*;
        pub use crate::domain::entities::grid_config::*;
        pub use crate::domain::entities::imported_record::*;
        pub use crate::domain::entities::row::*;
        pub use crate::domain::entities::row_edit::*;
    }

    pub mod periods {
        pub use crate::domain::logic::period_parser::{
            is_leap_year, last_day_of_month, parse_period,
        };
        pub use crate::presentation::period_fmt::format_period_display;
    }

    pub mod grid {
        pub use crate::data::repositories::csv_rows_repository_impl::CsvRowsRepositoryImpl;
        pub use crate::domain::logic::grid_engine::{GridEngine, ReloadOutcome};
        pub use crate::domain::repositories::rows_repository::RowsRepository;
        pub use crate::domain::usecases::refresh_usecase::{AutoRefreshHandle, GridSession};
        pub use crate::presentation::cell_fmt::{format_cell, format_total};
        pub use crate::presentation::grid_export::GridExport;
    }
}
