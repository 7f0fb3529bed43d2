// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Assistant policy: the prompt preamble, the topic allow-list and the fixed
//! texts shown to users.
//!
//! The keyword list and the preamble describe the same set of topics. Change
//! them together and bump [`POLICY_VERSION`].

/// Version tag of the policy text, logged with every prompt.
pub const POLICY_VERSION: &str = "2025-03-confirmed-actions";

/// Literal action tag for calendar event creation.
pub const CREATE_EVENT_ACTION: &str = "create_calendar_event";

/// Topic allow-list, matched case-insensitively as substrings.
pub const FITNESS_KEYWORDS: &[&str] = &[
    // Training modalities
    "gym",
    "fitness",
    "latihan",
    "workout",
    "olahraga",
    "exercise",
    "training",
    "sesi latihan",
    "program latihan",
    "routine",
    "plan",
    "angkat beban",
    "resistance training",
    "weightlifting",
    "strength training",
    "hypertrophy",
    "hipertrofi",
    "powerlifting",
    "crossfit",
    "cardio",
    "kardio",
    "endurance",
    "daya tahan",
    "stretching",
    "peregangan",
    "warm up",
    "pemanasan",
    // Programming vocabulary
    "set",
    "rep",
    "repetisi",
    "superset",
    "dropset",
    "circuit",
    "compound",
    "isolation",
    "push",
    "pull",
    "legs",
    "squat",
    "deadlift",
    "bench press",
    "split",
    "bro split",
    "push pull legs",
    "upper lower",
    "full body",
    // Anatomy
    "otot",
    "muscle",
    "abs",
    "core",
    "chest",
    "dada",
    "punggung",
    "bahu",
    "shoulder",
    "kaki",
    "lengan",
    // Nutrition
    "nutrisi",
    "nutrition",
    "protein",
    "karbohidrat",
    "carbs",
    "lemak",
    "kalori",
    "calorie",
    "hidrasi",
    "fat loss",
    "bulking",
    "cutting",
    // Recovery
    "rest",
    "istirahat",
    "recovery",
    "pemulihan",
    "tidur",
    // Scheduling
    "jadwal",
    "buat jadwal",
    "atur waktu",
    "schedule",
    "reminder",
    "calendar",
    "kalender",
    "penjadwalan",
    "jadwal latihan",
    "waktu gym",
    "kapan latihan",
    "jam berapa gym",
];

/// Fixed policy header placed in front of every prompt.
pub const POLICY_PREAMBLE: &str = r#"Anda adalah asisten fitness dan gym yang berbasis evidence-based science.
Gunakan bahasa yang santai, ramah, dan mudah dipahami seperti ngobrol dengan
teman di gym, tetapi tetap akurat dan sertakan referensi ilmiah.

=====================
RUANG LINGKUP (HANYA jawab topik berikut):
- Pola latihan gym (hypertrophy, strength, endurance, fat loss)
- Waktu istirahat (antar set, antar sesi, recovery mingguan)
- Jadwal olahraga mingguan/bulanan
- Nutrisi dasar untuk fitness (protein, karbohidrat, lemak, hidrasi)
- Pola hidup sehat yang terkait performa (tidur untuk recovery, hidrasi)
- Penjadwalan latihan di Google Calendar
Tolak pertanyaan kesehatan umum yang tidak terkait fitness/gym.

=====================
REFERENSI (WAJIB):
- Organisasi resmi: ACSM, WHO, NSCA, ADA, ISSN
- Jurnal peer-reviewed: Sports Medicine, Journal of Strength and Conditioning Research, dll.
- Format: "(Sumber: ACSM, 2022)" atau "(Phillips et al., Journal of Sports Medicine, 2020)"
- Jika tidak ada referensi ilmiah, jawab: "Saya tidak menemukan referensi ilmiah yang akurat untuk hal tersebut. Silakan konsultasi dengan ahli."
- DILARANG memberikan diagnosa medis atau saran pengobatan. Untuk cedera atau penyakit, sarankan konsultasi profesional.

=====================
FORMAT JAWABAN (MARKDOWN):
- Gunakan judul/sub-judul dengan `###`.
- Gunakan daftar dengan tanda `* `.
- Pisahkan paragraf dengan baris kosong.
- Gunakan `**teks tebal**` untuk kata kunci penting.
- Gunakan emoji 2-3 kali per jawaban.

=====================
PENJADWALAN GOOGLE CALENDAR:
Jika user ingin membuat jadwal latihan, kumpulkan SEMUA detail berikut:
1. Jenis latihan (Upper Body, Lower Body, Cardio, dll)
2. Tanggal (YYYY-MM-DD)
3. Jam mulai (HH:MM, format 24 jam)
4. Durasi dalam jam (bilangan bulat 1 sampai 6)
5. Deskripsi singkat (opsional)

Tanyakan detail yang belum ada. Setelah semua lengkap, ringkas detailnya dan
minta user mengonfirmasi secara eksplisit (misalnya "ya, buatkan").

HANYA setelah user mengonfirmasi, tulis SATU objek JSON datar (tanpa objek
bersarang) dengan field: action bernilai "create_calendar_event", confirmed
bernilai true, title, date, time, duration (angka), dan description.

ATURAN KERAS:
- Jangan pernah menulis objek JSON sebelum user mengonfirmasi.
- Jangan pernah menulis contoh, template, atau ilustrasi format dalam bentuk JSON.
  Jika perlu menjelaskan format, jelaskan dengan kalimat biasa.
- Jangan menulis lebih dari satu objek JSON dalam satu jawaban."#;

/// Per-question instructions appended after the user question.
pub const ANSWER_INSTRUCTIONS: &str = r#"INSTRUKSI JAWABAN:
1. Jawab HANYA jika terkait fitness/gym/lifestyle untuk performa/penjadwalan latihan.
2. WAJIB berikan referensi ilmiah: (Sumber: ACSM, 2022) atau (Phillips et al., Journal, 2020).
3. Jika TIDAK ada referensi, katakan "Tidak ada referensi ilmiah yang akurat, konsultasi ahli".
4. Jika tentang penjadwalan, ikuti protokol konfirmasi di atas.
5. Struktur: pendahuluan, poin dengan referensi, kesimpulan.
6. Maksimal 300 kata.
7. Aspek medis: rujuk ke profesional dan sebutkan spesialis yang tepat."#;

/// Returned instead of an answer when the topic gate rejects a question.
pub const CAPABILITY_TEXT: &str = "🚫 Maaf, saya khusus membantu pertanyaan FITNESS & GYM seperti:

✅ YANG BISA SAYA BANTU:
• Pola latihan gym (strength, hypertrophy, endurance)
• Program latihan (split, full body, dll)
• Waktu istirahat dan recovery
• Jadwal latihan optimal
• Nutrisi untuk fitness (protein, carbs, meal timing)
• Lifestyle factors untuk performa gym
• Membuat jadwal latihan di Google Calendar

💡 PERTANYAAN YANG BISA DICOBA:
\"Buatkan jadwal latihan upper body besok pagi\"
\"Atur reminder gym untuk hari Senin\"
\"Schedule workout push-pull-legs minggu ini\"";

/// Suffix appended to every answered question.
pub const DISCLAIMER: &str = "\n\n⚠️ DISCLAIMER: Informasi ini bersifat umum. Konsultasikan dengan trainer atau dokter untuk program yang sesuai kondisi Anda.";

/// Returned by the completion client when the oracle produced no candidate text.
pub const NO_RESPONSE_TEXT: &str = "Maaf, tidak ada respons yang diterima.";

/// Shown when the completion call times out.
pub const TIMEOUT_TEXT: &str = "Maaf, request timeout. Silakan coba lagi.";

/// Shown when the completion call fails at the transport level.
pub const TRANSPORT_ERROR_TEXT: &str = "Maaf, terjadi kesalahan koneksi.";

/// Shown when the completion response cannot be decoded.
pub const MALFORMED_RESPONSE_TEXT: &str = "Maaf, terjadi kesalahan dalam memproses data.";

/// Shown for any other completion failure.
pub const UNEXPECTED_ERROR_TEXT: &str = "Maaf, terjadi kesalahan tidak terduga.";

/// Answer for `/chat` when no Gemini API key was configured.
pub const ASSISTANT_DISABLED_TEXT: &str =
    "❌ Error: API Key tidak ditemukan, chatbot tidak aktif.";

/// Answer for `/chat` when the question exceeds the accepted length.
pub const QUESTION_TOO_LONG_TEXT: &str =
    "Maaf, pertanyaan terlalu panjang. Silakan persingkat pertanyaan Anda (maksimal 2000 karakter).";

/// Calendar annotation text when Google Calendar rejected or failed the request.
pub const CALENDAR_FAILURE_TEXT: &str = "terjadi kesalahan pada Google Calendar, silakan coba lagi nanti";
