pub mod error;

pub mod base_ring {
    pub mod bezout;
    pub mod field_generals;
    pub mod finite_field;
    pub mod rationals;
}

pub mod linear_algebra {
    pub mod basis_key;
    pub mod linear_comb;
    pub mod linear_map;
    pub mod vector;
    pub mod vector_space;
}

pub mod chain_complex;

pub mod a_infinity {
    pub mod category;
    pub mod dynkin;
    pub mod module;
    pub mod module_map;
    pub mod words;
}
