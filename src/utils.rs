use rand::Rng;

pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LENGTH: usize = 8;

/// Samples `CODE_LENGTH` symbols uniformly and independently from `CODE_ALPHABET`.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Form used when comparing a submitted code against stored ones.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generated_codes_use_alphabet() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..256 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn normalization_ignores_case_and_padding() {
        assert_eq!(normalize_code(" ab3dEF12 "), "AB3DEF12");
        assert_eq!(normalize_code("AB3DEF12"), "AB3DEF12");
        assert_eq!(normalize_code("\tab3def12\n"), "AB3DEF12");
        assert_eq!(normalize_code("\u{131}bcdefgh"), "IBCDEFGH");
    }
}
