pub mod allow_list_rebuild;
