mod test_curve_search_basic;
mod test_field_basic;
