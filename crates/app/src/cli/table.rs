use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

/// Rounded table with the columns from `numeric_from` onwards right aligned.
pub(super) fn render(builder: Builder, numeric_from: usize) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(numeric_from..), Alignment::right());

    table
}
