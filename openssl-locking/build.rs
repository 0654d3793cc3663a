use std::env;

fn main() {
    println!("cargo:rustc-check-cfg=cfg(ossl110)");
    println!("cargo:rustc-check-cfg=cfg(libressl)");

    // LibreSSL keeps exporting the legacy CRYPTO_* locking entry points.
    if env::var("DEP_OPENSSL_LIBRESSL_VERSION_NUMBER").is_ok() {
        println!("cargo:rustc-cfg=libressl");
        return;
    }

    let version = match env::var("DEP_OPENSSL_VERSION_NUMBER") {
        Ok(version) => u64::from_str_radix(&version, 16).unwrap(),
        Err(_) => panic!("Unable to detect OpenSSL version"),
    };

    if version >= 0x1_01_00_00_0 {
        println!("cargo:rustc-cfg=ossl110");
    }
}
